use std::collections::HashSet;

use log::{debug, info};

use crate::{
    error::ConstraintOperationError,
    helper::usize_to_f64,
    parsing_types::ClauseReceiver,
    solver::{
        activity::ActivityPolicy,
        analysis::Analysis,
        clause::ClauseRef,
        clauses::{ClauseDatabase, Learned},
        literal::Literal,
        options::{PROGRESS_LOG_INTERVAL, SolverOptions, VerbosityLevel},
        order::VariableOrder,
        restart::RestartPolicy,
        statistics::SolverStatistics,
        trail::{Branch, Trail},
        variable::{Assignments, Variable, VariableState, VariableValue},
    },
    termination::{Indefinite, TerminationCondition},
    theory::{Model, Theorem, Theory, theorem_variable, variable_theorem},
};

pub mod activity;
mod analysis;
pub mod clause;
pub mod clauses;
pub mod literal;
pub mod options;
pub mod order;
mod propagation;
pub mod restart;
pub mod statistics;
pub mod trail;
pub mod variable;

/// Enum representing the solver status exit codes
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SolverExitCode {
    Unknown = 0,
    Sat = 10,
    Unsat = 20,
}

/// States of the search loop
#[derive(Clone, PartialEq, Eq, Debug)]
enum SearchState {
    /// Pick the next branching variable
    Deciding,
    /// Open a frame for the literal and propagate it
    Propagating(Literal, Branch),
    /// Learn from the falsified clause and unwind the trail
    Backtracking(Vec<Literal>),
    /// Search is over
    Finished(SolverExitCode),
}

/// A clause checked against the root assignment
enum Normalized {
    /// Some literal is true at the root, or the clause is a tautology
    Satisfied,
    /// Remaining literals, duplicates and root-false literals dropped
    Literals(Vec<Literal>),
}

/// Solver class
pub struct Solver {
    // -- Representation of the problem instance
    /// Original and learned clauses
    clauses: ClauseDatabase,
    /// Domain theory validating complete models
    theory: Option<Box<dyn Theory>>,
    /// Theorems pushed into the theory by the last accepted model
    theory_model: Vec<Theorem>,

    // -- Solver data structures
    /// Clauses to inspect once a literal becomes true, indexed by that literal
    watches: Vec<Vec<ClauseRef>>,
    /// Current variable assignments and their reasons
    assignments: Assignments,
    /// Free variables by activity
    order: VariableOrder,
    /// Root facts and decision frames
    trail: Trail,

    // -- Solver state
    /// Solver configuration
    options: SolverOptions,
    /// Adjusts activities after conflicts
    activity_policy: Box<dyn ActivityPolicy>,
    /// Decides when to unwind to the root
    restart_policy: Box<dyn RestartPolicy>,
    /// Whether the clauses were proven unsatisfiable
    infeasible: bool,
    /// Solver statistics
    stats: SolverStatistics,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    /// Create a new solver with default options
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(SolverOptions::default())
    }

    /// Create a new solver
    #[must_use]
    pub fn with_options(options: SolverOptions) -> Self {
        Self {
            clauses: ClauseDatabase::default(),
            theory: None,
            theory_model: Vec::new(),
            watches: vec![Vec::new(); 2],
            assignments: Assignments::default(),
            order: VariableOrder::default(),
            trail: Trail::default(),
            activity_policy: options.activity_policy(),
            restart_policy: options.restart_policy(),
            options,
            infeasible: false,
            stats: SolverStatistics::default(),
        }
    }

    /// Replaces the activity policy
    pub fn set_activity_policy(&mut self, policy: impl ActivityPolicy + 'static) {
        self.activity_policy = Box::new(policy);
    }

    /// Replaces the restart policy
    pub fn set_restart_policy(&mut self, policy: impl RestartPolicy + 'static) {
        self.restart_policy = Box::new(policy);
    }

    /// Installs the theory consulted on complete models
    pub fn set_theory(&mut self, theory: impl Theory + 'static) {
        self.theory = Some(Box::new(theory));
        self.theory_model.clear();
    }

    /// Installed theory
    #[must_use]
    pub fn theory(&self) -> Option<&dyn Theory> {
        self.theory.as_deref()
    }

    /// Installed theory
    pub fn theory_mut(&mut self) -> Option<&mut (dyn Theory + 'static)> {
        self.theory.as_deref_mut()
    }

    /// Number of variables
    #[must_use]
    pub const fn num_variables(&self) -> usize {
        self.stats.num_variables
    }

    /// Number of clauses
    #[must_use]
    pub const fn num_clauses(&self) -> usize {
        self.stats.num_clauses
    }

    /// Solver statistics
    #[must_use]
    pub const fn statistics(&self) -> &SolverStatistics {
        &self.stats
    }

    /// Solver configuration
    #[must_use]
    pub const fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Value of `variable`
    #[must_use]
    pub fn value(&self, variable: Variable) -> VariableValue {
        self.assignments.value(variable)
    }

    /// Value of `literal`
    #[must_use]
    pub fn literal_value(&self, literal: Literal) -> VariableValue {
        literal.value(&self.assignments)
    }

    /// True literal of every assigned variable; the model after a SAT answer
    #[must_use]
    pub fn model(&self) -> Vec<Literal> {
        self.assignments
            .variables()
            .filter_map(|variable| match self.assignments.state(variable) {
                VariableState::Free => None,
                VariableState::Assigned { value, .. } => {
                    Some(Literal::from_var_with_polarity(variable, value))
                }
            })
            .collect()
    }

    /// Stored original clauses
    pub fn original_clauses(&self) -> impl Iterator<Item = &[Literal]> {
        self.clauses
            .iter()
            .filter(|clause_ref| !clause_ref.is_learned())
            .map(|clause_ref| &self.clauses[clause_ref])
    }

    /// Stored learned clauses and theory lemmas
    pub fn learned_clauses(&self) -> impl Iterator<Item = &[Literal]> {
        self.clauses
            .iter()
            .filter(ClauseRef::is_learned)
            .map(|clause_ref| &self.clauses[clause_ref])
    }

    /// Literals fixed at the root
    #[must_use]
    pub fn root_facts(&self) -> &[Literal] {
        self.trail.root()
    }

    /// Decision frames of the last search
    #[must_use]
    pub const fn trail(&self) -> &Trail {
        &self.trail
    }

    /// Adds a clause.
    ///
    /// The clause is checked against the root first: duplicates and literals
    /// false at the root are dropped, satisfied clauses are skipped, and a
    /// single remaining literal is asserted as a root fact.
    ///
    /// # Errors
    /// If the clause set became unsatisfiable, or already was.
    ///
    /// # Panics
    /// If a literal is invalid.
    pub fn add_clause(&mut self, literals: &[Literal]) -> Result<(), ConstraintOperationError> {
        if self.infeasible {
            return Err(ConstraintOperationError::InfeasibleState);
        }
        self.backtrack_to_root();
        for literal in literals {
            assert!(literal.valid(), "clause contains an invalid literal");
            self.register_variable(literal.var());
        }

        let Normalized::Literals(clause) = self.normalize(literals) else {
            return Ok(());
        };
        match clause.as_slice() {
            [] => {
                self.infeasible = true;
                Err(ConstraintOperationError::InfeasibleClause)
            }
            [fact] => {
                if self.assert_root_fact(*fact) {
                    Ok(())
                } else {
                    self.infeasible = true;
                    Err(ConstraintOperationError::InfeasibleClause)
                }
            }
            _ => {
                let clause_ref = self.clauses.add_clause(&clause);
                self.watch(clause_ref);
                self.stats.num_clauses += 1;
                self.stats.num_literals_in_clauses += clause.len();
                Ok(())
            }
        }
    }

    /// Solves the loaded clauses; true if they are satisfiable
    pub fn solve(&mut self) -> bool {
        self.solve_until(&mut Indefinite) == SolverExitCode::Sat
    }

    /// Solves the loaded clauses, polling `termination` before every decision
    pub fn solve_until(&mut self, termination: &mut impl TerminationCondition) -> SolverExitCode {
        if self.infeasible {
            return SolverExitCode::Unsat;
        }
        self.backtrack_to_root();
        self.retract_theory_model();

        let mut conflicts_since_restart = 0;
        let mut state = SearchState::Deciding;
        let exit_code = loop {
            state = match state {
                SearchState::Deciding => {
                    if termination.should_stop() && !self.order.is_empty() {
                        SearchState::Finished(SolverExitCode::Unknown)
                    } else if let Some(variable) = self.choose() {
                        termination.decision_has_been_made();
                        // Default polarity: negative
                        let literal = Literal::from_var_with_polarity(variable, false);
                        SearchState::Propagating(literal, Branch::First)
                    } else {
                        match self.consult_theory() {
                            None => SearchState::Finished(SolverExitCode::Sat),
                            Some(explanation) => self.learn_theory_lemma(&explanation),
                        }
                    }
                }
                SearchState::Propagating(literal, branch) => self.step(literal, branch),
                SearchState::Backtracking(conflict) => {
                    self.stats.num_total_conflicts += 1;
                    conflicts_since_restart += 1;
                    self.log_progress();

                    let next = self.resolve_conflict(&conflict);
                    if !matches!(next, SearchState::Finished(_))
                        && self.restart_policy.should_restart(conflicts_since_restart)
                    {
                        if let SearchState::Propagating(literal, _) = next {
                            // The flipped variable was kept out of the order
                            let _ = self.order.insert(literal.var());
                        }
                        conflicts_since_restart = 0;
                        self.restart();
                        SearchState::Deciding
                    } else {
                        next
                    }
                }
                SearchState::Finished(exit_code) => break exit_code,
            };
        };

        if exit_code == SolverExitCode::Unsat {
            self.infeasible = true;
        }
        info!(
            "search finished with {exit_code:?} after {} decisions and {} conflicts",
            self.stats.num_decisions, self.stats.num_total_conflicts
        );
        exit_code
    }

    /// Dequeues the next branching variable
    fn choose(&mut self) -> Option<Variable> {
        let variable = self.order.pop_best()?;
        self.stats.num_decisions += 1;
        Some(variable)
    }

    /// Opens a frame deciding `decision` and propagates it
    fn step(&mut self, decision: Literal, branch: Branch) -> SearchState {
        debug!("deciding {decision} ({branch:?} branch)");
        self.trail.push(decision, branch);
        self.assign(decision, None);
        match self.propagate(decision) {
            None => {
                if let Some(frame) = self.trail.top_mut() {
                    frame.succeed();
                }
                SearchState::Deciding
            }
            Some(conflict) => SearchState::Backtracking(self.clauses[conflict].to_vec()),
        }
    }

    /// Learns from a falsified clause and moves the trail to where search resumes
    fn resolve_conflict(&mut self, conflict: &[Literal]) -> SearchState {
        if self.trail.is_empty() {
            return SearchState::Finished(SolverExitCode::Unsat);
        }

        match self.analyze(conflict) {
            Analysis::Refutation => SearchState::Finished(SolverExitCode::Unsat),
            Analysis::Unit(literal) => {
                self.stats.num_unit_conflicts += 1;
                if let Some(frame) = self.trail.top_mut() {
                    frame.fail(None);
                }
                debug!("unit conflict, asserting {literal} at the root");
                self.backtrack_to_root();
                if self.assert_root_fact(literal) {
                    SearchState::Deciding
                } else {
                    SearchState::Finished(SolverExitCode::Unsat)
                }
            }
            Analysis::Clause {
                clause_ref,
                backjump_level,
            } => {
                if self.trail.decision_level() > backjump_level {
                    debug!(
                        "backjumping from level {} to {backjump_level}",
                        self.trail.decision_level()
                    );
                }
                while self.trail.decision_level() > backjump_level {
                    self.unfold(false);
                }
                if let Some(frame) = self.trail.top_mut() {
                    frame.fail(Some(clause_ref));
                }
                self.retry_or_backtrack()
            }
        }
    }

    /// Flips the failed top frame if its second branch is untried; otherwise
    /// pops it and fails its parent, until a frame can be flipped
    fn retry_or_backtrack(&mut self) -> SearchState {
        while let Some(frame) = self.trail.top() {
            let decision = frame.decision();
            if frame.branch() == Branch::First {
                self.unfold(true);
                debug!("flipping {decision} to {}", !decision);
                return SearchState::Propagating(!decision, Branch::Second);
            }
            self.unfold(false);
            if let Some(parent) = self.trail.top_mut() {
                parent.fail(None);
            }
        }
        SearchState::Finished(SolverExitCode::Unsat)
    }

    /// Pops the top frame and frees its variables. With `reentrant` the decided
    /// variable stays out of the order since it is decided again right away.
    fn unfold(&mut self, reentrant: bool) {
        let Some(frame) = self.trail.pop() else {
            return;
        };
        let decided = frame.decision().var();
        self.assignments.unassign(decided);
        if !reentrant {
            let _ = self.order.insert(decided);
        }
        for literal in frame.propagated() {
            self.assignments.unassign(literal.var());
            let _ = self.order.insert(literal.var());
        }
    }

    /// Pops every frame
    fn backtrack_to_root(&mut self) {
        while !self.trail.is_empty() {
            self.unfold(false);
        }
    }

    fn restart(&mut self) {
        debug!("restart after {} conflicts", self.stats.num_total_conflicts);
        self.backtrack_to_root();
        self.restart_policy.on_restart();
        self.stats.num_restarts += 1;
    }

    /// Asserts `literal` at the root and propagates it; false on conflict
    fn assert_root_fact(&mut self, literal: Literal) -> bool {
        debug_assert!(self.trail.is_empty());
        debug_assert!(literal.is_unset(&self.assignments));
        self.assign(literal, None);
        self.propagate(literal).is_none()
    }

    /// Pushes the model into the theory and checks it; returns the
    /// explanation if the theory rejects it
    fn consult_theory(&mut self) -> Option<Model> {
        let theory = self.theory.as_deref_mut()?;
        let model: Model = self
            .assignments
            .variables()
            .map(|variable| (variable, variable_theorem(variable)))
            .filter(|&(_, theorem)| theory.has_theorem(theorem))
            .map(|(variable, theorem)| (self.assignments.value(variable).is_true(), theorem))
            .collect();
        theory.add_clauses(&model);
        let theorems: Vec<Theorem> = model.iter().map(|&(_, theorem)| theorem).collect();
        if theory.check() {
            self.theory_model = theorems;
            return None;
        }

        let explanation = theory.explain();
        theory.remove_clauses(&theorems);
        self.stats.num_bad_models += 1;
        debug!("theory rejected the model, explanation {explanation:?}");
        Some(explanation)
    }

    /// Retracts the model pushed by the last accepted theory check
    fn retract_theory_model(&mut self) {
        if let Some(theory) = self.theory.as_deref_mut() {
            if !self.theory_model.is_empty() {
                theory.remove_clauses(&self.theory_model);
                self.theory_model.clear();
            }
        }
    }

    /// Turns a theory explanation into a lemma and treats it as a conflict
    fn learn_theory_lemma(&mut self, explanation: &[(bool, Theorem)]) -> SearchState {
        let lemma: Vec<Literal> = explanation
            .iter()
            .map(|&(value, theorem)| {
                let variable = theorem_variable(theorem);
                assert!(
                    variable <= self.assignments.num_variables(),
                    "theory explained with unknown theorem {theorem}"
                );
                Literal::from_var_with_polarity(variable, !value)
            })
            .collect();
        assert!(
            lemma.iter().all(|literal| literal.is_false(&self.assignments)),
            "theory explanation is not part of the rejected model"
        );

        let mut lemma = match self.normalize(&lemma) {
            Normalized::Literals(literals) => literals,
            Normalized::Satisfied => unreachable!("a falsified lemma cannot be satisfied"),
        };
        match lemma.len() {
            0 => SearchState::Finished(SolverExitCode::Unsat),
            1 => {
                self.backtrack_to_root();
                if self.assert_root_fact(lemma[0]) {
                    SearchState::Deciding
                } else {
                    SearchState::Finished(SolverExitCode::Unsat)
                }
            }
            _ => {
                self.sort_by_level(&mut lemma);
                let _ = self.store_learned(&lemma);
                SearchState::Backtracking(lemma)
            }
        }
    }

    /// Checks `literals` against the root assignment
    fn normalize(&self, literals: &[Literal]) -> Normalized {
        let mut seen = HashSet::with_capacity(literals.len());
        let mut kept = Vec::with_capacity(literals.len());
        for &literal in literals {
            // `not A or A` is always true
            if seen.contains(&!literal) {
                return Normalized::Satisfied;
            }
            if !seen.insert(literal) {
                continue;
            }
            match self.assignments.state(literal.var()) {
                VariableState::Assigned {
                    level: 0, value, ..
                } if value == literal.polarity() => return Normalized::Satisfied,
                VariableState::Assigned { level: 0, .. } => {}
                _ => kept.push(literal),
            }
        }
        Normalized::Literals(kept)
    }

    /// Orders literals by the decision level of their variable, lowest first
    fn sort_by_level(&self, literals: &mut [Literal]) {
        literals.sort_by_key(|literal| self.assignments.level(literal.var()));
    }

    /// Stores a learned clause and watches it
    fn store_learned(&mut self, literals: &[Literal]) -> Learned {
        let learned = self.clauses.learn(literals);
        if let Learned::Clause(clause_ref) = learned {
            self.watch(clause_ref);
            self.stats.num_learned_clauses += 1;
            self.stats.num_literals_in_learned_clauses += literals.len();
        }
        learned
    }

    /// Registers the watchers of a stored clause
    fn watch(&mut self, clause_ref: ClauseRef) {
        for watcher in self.clauses.watchers(clause_ref) {
            self.watches[(!watcher).repr()].push(clause_ref);
        }
    }

    /// Makes every variable up to `variable` known to the solver
    fn register_variable(&mut self, variable: Variable) {
        if variable <= self.assignments.num_variables() {
            return;
        }
        self.assignments.grow_to(variable);
        self.order.grow_to(variable);
        self.watches.resize(2 * variable + 2, Vec::new());
        self.stats.num_variables = variable;
    }

    /// Fraction of variables fixed at the root
    fn progress_estimate(&self) -> f64 {
        usize_to_f64(self.trail.root().len()) / usize_to_f64(self.num_variables().max(1))
    }

    fn log_progress(&self) {
        if self.options.verbosity != VerbosityLevel::All
            || self.stats.num_total_conflicts % PROGRESS_LOG_INTERVAL != 0
        {
            return;
        }
        let literals_per_learned = usize_to_f64(self.stats.num_literals_in_learned_clauses)
            / usize_to_f64(self.stats.num_learned_clauses.max(1));
        info!(
            "| {:>9} | {:>7} {:>8} {:>8} | {:>8} {:>6.0} | {:>6.3} % |",
            self.stats.num_total_conflicts,
            self.order.len(),
            self.stats.num_clauses,
            self.stats.num_literals_in_clauses,
            self.stats.num_learned_clauses,
            literals_per_learned,
            self.progress_estimate() * 100.0
        );
    }
}

/// Adding clauses to a solver
impl ClauseReceiver for Solver {
    fn create_variables(&mut self, num_variables: usize) {
        if num_variables > 0 {
            self.register_variable(num_variables);
        }
    }

    fn add_clause(&mut self, literals: &[Literal]) -> Result<(), ConstraintOperationError> {
        Solver::add_clause(self, literals)
    }
}

#[cfg(test)]
impl Solver {
    /// Asserts the order/free correspondence and the watcher bookkeeping
    pub(crate) fn check_invariants(&self) {
        for variable in self.assignments.variables() {
            assert_eq!(
                self.order.contains(variable),
                self.assignments.is_free(variable),
                "order and free pool disagree on variable {variable}"
            );
        }
        for clause_ref in self.clauses.iter() {
            let watchers = self.clauses.watchers(clause_ref);
            assert_ne!(watchers[0], watchers[1]);
            for watcher in watchers {
                assert!(self.clauses[clause_ref].contains(&watcher));
                assert!(self.watches[(!watcher).repr()].contains(&clause_ref));
            }
            assert!(
                !watchers.iter().all(|watcher| watcher.is_false(&self.assignments)),
                "both watchers of {:?} are false",
                &self.clauses[clause_ref]
            );
        }
    }
}
