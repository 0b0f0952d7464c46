use crate::solver::{clause::ClauseRef, literal::Literal};

/// Variable type; variables are numbered from 1, slot 0 is never used
pub type Variable = usize;

/// Variable value type
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum VariableValue {
    False = 0,
    True = 1,
    #[default]
    Unset = 2,
}

impl VariableValue {
    /// Variable from bool
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }

    /// Whether is false
    #[must_use]
    pub fn is_false(self) -> bool {
        self == VariableValue::False
    }
    /// Whether is true
    #[must_use]
    pub fn is_true(self) -> bool {
        self == VariableValue::True
    }
    /// Whether is unset
    #[must_use]
    pub fn is_unset(self) -> bool {
        self == VariableValue::Unset
    }
}

impl PartialEq<bool> for VariableValue {
    fn eq(&self, other: &bool) -> bool {
        *self == VariableValue::from_bool(*other)
    }
}

/// Assignment record of a single variable.
///
/// A variable is either free, or assigned at some decision level. An assigned
/// variable without a reason was decided (or asserted as a root fact); one with
/// a reason was forced by unit propagation over that clause.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum VariableState {
    #[default]
    Free,
    Assigned {
        value: bool,
        level: usize,
        reason: Option<ClauseRef>,
    },
}

impl VariableState {
    /// Whether the variable is free
    #[must_use]
    pub const fn is_free(&self) -> bool {
        matches!(self, VariableState::Free)
    }

    /// Tri-state value of the variable
    #[must_use]
    pub const fn value(&self) -> VariableValue {
        match self {
            VariableState::Free => VariableValue::Unset,
            VariableState::Assigned { value, .. } => VariableValue::from_bool(*value),
        }
    }
}

/// Assignment records of all variables
#[derive(Clone, Debug)]
pub struct Assignments {
    states: Vec<VariableState>,
}

impl Default for Assignments {
    fn default() -> Self {
        Self {
            states: vec![VariableState::Free],
        }
    }
}

impl Assignments {
    /// Number of registered variables
    #[must_use]
    pub fn num_variables(&self) -> usize {
        self.states.len() - 1
    }

    /// Registers every variable up to and including `variable` as free
    pub fn grow_to(&mut self, variable: Variable) {
        if variable >= self.states.len() {
            self.states.resize(variable + 1, VariableState::Free);
        }
    }

    /// Record of `variable`
    #[must_use]
    pub fn state(&self, variable: Variable) -> VariableState {
        self.states[variable]
    }

    /// Value of `variable`
    #[must_use]
    pub fn value(&self, variable: Variable) -> VariableValue {
        self.states[variable].value()
    }

    /// Whether `variable` is free
    #[must_use]
    pub fn is_free(&self, variable: Variable) -> bool {
        self.states[variable].is_free()
    }

    /// Decision level `variable` was assigned at
    #[must_use]
    pub fn level(&self, variable: Variable) -> Option<usize> {
        match self.states[variable] {
            VariableState::Free => None,
            VariableState::Assigned { level, .. } => Some(level),
        }
    }

    /// Makes `literal` true
    pub fn assign(&mut self, literal: Literal, level: usize, reason: Option<ClauseRef>) {
        let state = &mut self.states[literal.var()];
        debug_assert!(state.is_free(), "variable {} assigned twice", literal.var());
        *state = VariableState::Assigned {
            value: literal.polarity(),
            level,
            reason,
        };
    }

    /// Returns `variable` to the free pool
    pub fn unassign(&mut self, variable: Variable) {
        self.states[variable] = VariableState::Free;
    }

    /// All registered variables
    #[must_use]
    pub fn variables(&self) -> std::ops::Range<Variable> {
        1..self.states.len()
    }
}
