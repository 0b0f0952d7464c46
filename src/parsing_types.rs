use crate::{error::ConstraintOperationError, solver::literal::Literal};

/// Trait describing that a struct can process clauses
pub trait ClauseReceiver {
    /// Creates `num_variables` variables
    fn create_variables(&mut self, num_variables: usize);
    /// Add clauses
    ///
    /// # Errors
    /// If the receiver became infeasible; parsing stops early then.
    fn add_clause(&mut self, literals: &[Literal]) -> Result<(), ConstraintOperationError>;
}
