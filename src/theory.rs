//! The seam between the boolean core and a domain-specific theory.
//!
//! A theorem identifier doubles as the id of the boolean variable standing for
//! it. Once every variable is assigned, the solver pushes the relevant part of
//! the model into the theory and asks it to [`Theory::check`] the result. A
//! rejecting theory must [`Theory::explain`] itself with a sub-model that is
//! already inconsistent; its negation is learned as a theory lemma.

use std::io::{BufRead, Write};

use thiserror::Error;

use crate::solver::{literal::Literal, variable::Variable};

/// Theorem identifier; equal to the id of its boolean variable
pub type Theorem = i64;

/// Partial model handed to or returned by a theory; `(value, theorem)` pairs
pub type Model = Vec<(bool, Theorem)>;

/// Errors raised by theorem persistence
#[derive(Error, Debug)]
pub enum TheoryError {
    #[error("I/O error while accessing theorem storage: {0}")]
    Io(#[from] std::io::Error),
    #[error("theorem {0} is not known to the theory")]
    UnknownTheorem(Theorem),
    #[error("theorem {id} is malformed: {reason}")]
    Malformed { id: Theorem, reason: String },
}

/// A domain-specific consistency checker plugged into the solver
pub trait Theory {
    /// Reads the definition of theorem `id`
    fn read(&mut self, id: Theorem, reader: &mut dyn BufRead) -> Result<(), TheoryError>;
    /// Writes the definition of `theorem`
    fn write(&self, writer: &mut dyn Write, theorem: Theorem) -> Result<(), TheoryError>;
    /// Whether `theorem` is defined
    fn has_theorem(&self, theorem: Theorem) -> bool;
    /// Forgets `theorem`
    fn remove(&mut self, theorem: Theorem);

    /// Asserts a single theorem with the given polarity
    fn add_theory_clause(&mut self, theorem: Theorem, polarity: bool) {
        self.add_clauses(&[(polarity, theorem)]);
    }
    /// Retracts a single theorem
    fn remove_theory_clause(&mut self, theorem: Theorem) {
        self.remove_clauses(&[theorem]);
    }
    /// Asserts every entry of `model`
    fn add_clauses(&mut self, model: &[(bool, Theorem)]);
    /// Retracts the given theorems
    fn remove_clauses(&mut self, theorems: &[Theorem]);

    /// Whether the asserted theorems are consistent
    fn check(&mut self) -> bool;
    /// A minimal inconsistent subset of the asserted theorems; only called
    /// after [`Theory::check`] failed
    fn explain(&mut self) -> Model;
}

/// Boolean variable standing for `theorem`
///
/// # Panics
/// If `theorem` is not a positive identifier.
#[must_use]
pub fn theorem_variable(theorem: Theorem) -> Variable {
    assert!(theorem > 0, "theorem ids start at 1, got {theorem}");
    Literal::from_signed(theorem).var()
}

/// Theorem standing for `variable`
#[must_use]
pub fn variable_theorem(variable: Variable) -> Theorem {
    Literal::from_var_with_polarity(variable, true).to_signed()
}
