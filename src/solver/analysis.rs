use log::debug;

use crate::solver::{
    Solver,
    clause::ClauseRef,
    clauses::Learned,
    literal::Literal,
    variable::VariableState,
};

/// Clause derived from a conflict
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(super) enum Analysis {
    /// The conflict depends on root facts only
    Refutation,
    /// A single decision is to blame; its negation holds at the root
    Unit(Literal),
    /// Stored clause whose deepest literal was decided at `backjump_level`
    Clause {
        clause_ref: ClauseRef,
        backjump_level: usize,
    },
}

impl Solver {
    /// Resolves the falsified `conflict` with the reasons of its literals
    /// until only decided literals remain, and stores the result.
    ///
    /// Literals false at the root are dropped. The remaining ones are sorted by
    /// decision level, so the two deepest end up watched.
    pub(super) fn analyze(&mut self, conflict: &[Literal]) -> Analysis {
        let mut seen = vec![false; self.assignments.num_variables() + 1];
        let mut pending = Vec::with_capacity(conflict.len());
        for &literal in conflict {
            if !seen[literal.var()] {
                seen[literal.var()] = true;
                pending.push(literal);
            }
        }

        let mut involved = Vec::new();
        let mut learned = Vec::new();
        while let Some(literal) = pending.pop() {
            debug_assert!(literal.is_false(&self.assignments));
            let variable = literal.var();
            involved.push(variable);
            match self.assignments.state(variable) {
                VariableState::Assigned { level: 0, .. } => {}
                VariableState::Assigned {
                    reason: Some(reason),
                    ..
                } => {
                    for &antecedent in &self.clauses[reason] {
                        if !seen[antecedent.var()] {
                            seen[antecedent.var()] = true;
                            pending.push(antecedent);
                        }
                    }
                }
                VariableState::Assigned { reason: None, .. } => learned.push(literal),
                VariableState::Free => unreachable!("conflict literal {literal} is unassigned"),
            }
        }

        self.activity_policy.on_conflict(&involved, &mut self.order);

        self.sort_by_level(&mut learned);
        let Some(&deepest) = learned.last() else {
            return Analysis::Refutation;
        };
        let backjump_level = self.assignments.level(deepest.var()).unwrap_or_default();
        match self.store_learned(&learned) {
            Learned::Unit(literal) => Analysis::Unit(literal),
            Learned::Clause(clause_ref) => {
                debug!("learned clause of {} literals", learned.len());
                Analysis::Clause {
                    clause_ref,
                    backjump_level,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Analysis;
    use crate::solver::{
        Solver, SearchState, literal::Literal, order::INITIAL_ACTIVITY, trail::Branch,
    };

    fn lit(signed: i32) -> Literal {
        Literal::from_dimacs(signed)
    }

    fn lits(signed: &[i32]) -> Vec<Literal> {
        signed.iter().map(|&l| lit(l)).collect()
    }

    fn solver_with(clauses: &[&[i32]]) -> Solver {
        let mut solver = Solver::new();
        for clause in clauses {
            solver.add_clause(&lits(clause)).expect("feasible at the root");
        }
        solver
    }

    fn conflict_after(solver: &mut Solver, decisions: &[i32]) -> Vec<Literal> {
        for &decision in decisions {
            if let SearchState::Backtracking(conflict) = solver.step(lit(decision), Branch::First)
            {
                return conflict;
            }
        }
        panic!("decisions {decisions:?} did not conflict");
    }

    #[test]
    fn single_decision_conflict_is_a_unit() {
        let mut solver = solver_with(&[&[1, 2], &[1, 3], &[-2, -3]]);
        let conflict = conflict_after(&mut solver, &[-1]);
        assert_eq!(solver.analyze(&conflict), Analysis::Unit(lit(1)));
        assert_eq!(solver.learned_clauses().count(), 0);
    }

    #[test]
    fn learned_clause_negates_the_decisions_ordered_by_level() {
        let mut solver = solver_with(&[&[1, 2, 3], &[1, 2, -3], &[4, 5]]);
        let conflict = conflict_after(&mut solver, &[-1, -2]);
        let Analysis::Clause {
            clause_ref,
            backjump_level,
        } = solver.analyze(&conflict)
        else {
            panic!("expected a stored clause");
        };
        assert_eq!(backjump_level, 2);
        assert_eq!(&solver.clauses[clause_ref], lits(&[1, 2]).as_slice());
        assert_eq!(solver.clauses.watchers(clause_ref), [lit(2), lit(1)]);
        assert!(solver.watches[lit(-2).repr()].contains(&clause_ref));
        assert!(solver.watches[lit(-1).repr()].contains(&clause_ref));
        assert_eq!(solver.statistics().num_learned_clauses, 1);
    }

    #[test]
    fn irrelevant_decisions_stay_out_of_the_clause() {
        let mut solver = solver_with(&[&[1, 3, 4], &[1, 3, -4], &[2, 5]]);
        let conflict = conflict_after(&mut solver, &[-1, -2, -3]);
        let Analysis::Clause { clause_ref, .. } = solver.analyze(&conflict) else {
            panic!("expected a stored clause");
        };
        assert_eq!(&solver.clauses[clause_ref], lits(&[1, 3]).as_slice());
    }

    #[test]
    fn root_facts_are_dropped() {
        let mut solver = solver_with(&[&[1, 6, 2], &[1, 6, -2], &[-6]]);
        let conflict = conflict_after(&mut solver, &[-1]);
        assert_eq!(solver.analyze(&conflict), Analysis::Unit(lit(1)));
    }

    #[test]
    fn root_only_conflict_is_a_refutation() {
        let mut solver = solver_with(&[&[1], &[2]]);
        let conflict = lits(&[-1, -2]);
        assert_eq!(solver.analyze(&conflict), Analysis::Refutation);
    }

    #[test]
    fn involved_variables_reach_the_activity_policy() {
        let mut solver = solver_with(&[&[1, 2], &[1, 3], &[-2, -3], &[4, 5]]);
        solver.set_activity_policy(crate::solver::activity::Vsids::new(0.5, 1.0));
        let conflict = conflict_after(&mut solver, &[-1]);
        let _ = solver.analyze(&conflict);
        for variable in 1..=3 {
            assert!(solver.order.activity(variable) > INITIAL_ACTIVITY);
        }
        assert!((solver.order.activity(4) - INITIAL_ACTIVITY).abs() < f64::EPSILON);
    }
}
