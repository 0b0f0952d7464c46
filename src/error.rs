use thiserror::Error;

use crate::parsing::DimacsParseError;

/// Errors related to adding clauses to the [`crate::solver::Solver`].
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConstraintOperationError {
    /// Adding the clause made the clause set unsatisfiable at the root.
    #[error("Adding the clause failed because it is infeasible at the root")]
    InfeasibleClause,
    /// A clause was added while the solver already was in an infeasible state.
    #[error("Adding the clause failed because the solver is in an infeasible state")]
    InfeasibleState,
}

pub type NanosmtResult<T> = Result<T, NanosmtError>;

/// Errors of the command-line driver
#[derive(Error, Debug)]
pub enum NanosmtError {
    #[error("IO error, more details: {0}")]
    Io(#[from] std::io::Error),
    #[error("The dimacs file was invalid, more details: {0}")]
    InvalidDimacs(#[from] DimacsParseError),
    #[error("Failed to configure logging, more details: {0}")]
    Logging(#[from] log::SetLoggerError),
}
