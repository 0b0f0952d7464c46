use std::{fmt, ops::Not};

use crate::solver::variable::{Assignments, Variable, VariableValue};

/// Literal type
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Literal {
    /// Literal representation; positive and negative literals are consecutive;
    /// `[    2, 3,     4, 5, ...]`
    /// `[not 1, 1, not 2, 2, ...]`
    repr: usize,
}

impl Literal {
    /// Invalid literal
    const INVALID: usize = usize::MAX;

    /// Constructs a literal from a variable (1..=n)
    /// with polarity (+ : true, - : false)
    #[must_use]
    pub const fn from_var_with_polarity(variable: Variable, polarity: bool) -> Self {
        debug_assert!(variable != 0);
        Literal {
            repr: 2 * variable + polarity as usize,
        }
    }

    /// Constructs a literal from its signed form; magnitude is the variable,
    /// sign the polarity.
    ///
    /// # Panics
    /// If `literal` is 0, which names no variable.
    #[must_use]
    pub fn from_signed(literal: i64) -> Self {
        assert!(literal != 0, "0 is not a literal");
        let variable = usize::try_from(literal.unsigned_abs())
            .unwrap_or_else(|_| panic!("literal {literal} does not fit the variable space"));
        Self::from_var_with_polarity(variable, literal > 0)
    }

    /// Constructs a literal from a DIMACS literal
    ///
    /// # Panics
    /// If `literal` is 0.
    #[must_use]
    pub fn from_dimacs(literal: i32) -> Self {
        Self::from_signed(i64::from(literal))
    }

    /// Signed form of the literal
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub const fn to_signed(&self) -> i64 {
        let variable = self.var() as i64;
        if self.polarity() { variable } else { -variable }
    }

    /// Access representation for indexing
    #[must_use]
    pub const fn repr(&self) -> usize {
        self.repr
    }
    /// The variable used in the literal
    #[must_use]
    pub const fn var(&self) -> Variable {
        self.repr >> 1
    }
    /// The polarity of the literal (+ : true, - : false)
    #[must_use]
    pub const fn polarity(&self) -> bool {
        (self.repr & 1) != 0
    }
    /// Whether is valid
    #[must_use]
    pub const fn valid(&self) -> bool {
        self.repr != Self::INVALID && self.var() != 0
    }

    /// Value of the literal under `assignments`
    #[must_use]
    pub fn value(&self, assignments: &Assignments) -> VariableValue {
        match assignments.value(self.var()) {
            VariableValue::Unset => VariableValue::Unset,
            value => VariableValue::from_bool(value == self.polarity()),
        }
    }
    /// Whether literal evaluates to true
    #[must_use]
    pub fn is_true(&self, assignments: &Assignments) -> bool {
        assignments.value(self.var()) == self.polarity()
    }
    /// Whether literal evaluates to false
    #[must_use]
    pub fn is_false(&self, assignments: &Assignments) -> bool {
        assignments.value(self.var()) == !self.polarity()
    }
    /// Whether literal evaluates to undetermined value
    #[must_use]
    pub fn is_unset(&self, assignments: &Assignments) -> bool {
        assignments.value(self.var()).is_unset()
    }
}

impl Default for Literal {
    fn default() -> Self {
        Self {
            repr: Self::INVALID,
        }
    }
}

/// Implement negation for literals
impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self::Output {
        Literal {
            repr: self.repr ^ 1,
        }
    }
}

/// Prints the signed form
impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_signed())
    }
}
