/// Solver statistics
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SolverStatistics {
    /// Number of variables
    pub num_variables: usize,
    /// Number of clauses
    pub num_clauses: usize,
    /// Number of literals in clauses
    pub num_literals_in_clauses: usize,
    /// Number of learned clauses, theory lemmas included
    pub num_learned_clauses: usize,
    /// Number of literals in learned clauses
    pub num_literals_in_learned_clauses: usize,
    /// Number of search restarts
    pub num_restarts: usize,
    /// Number of made decisions
    pub num_decisions: usize,
    /// Number of total conflicts
    pub num_total_conflicts: usize,
    /// Number of conflicts that were resolved into a root fact
    pub num_unit_conflicts: usize,
    /// Number of complete models rejected by the theory
    pub num_bad_models: usize,
    /// Number of total propagations
    pub num_propagations: usize,
}
