use std::collections::VecDeque;

use log::trace;

use crate::solver::{Solver, clause::ClauseRef, literal::Literal};

impl Solver {
    /// Makes `literal` true at the current decision level
    pub(super) fn assign(&mut self, literal: Literal, reason: Option<ClauseRef>) {
        let level = self.trail.decision_level();
        self.assignments.assign(literal, level, reason);
        let _ = self.order.remove(literal.var());
        // Decisions are held by their frame
        if reason.is_some() || level == 0 {
            self.trail.record(literal);
        }
    }

    /// Unit propagation of a freshly assigned `literal` and everything it
    /// forces, breadth first. Returns the clause that became false, if any.
    pub(super) fn propagate(&mut self, literal: Literal) -> Option<ClauseRef> {
        let mut pending = VecDeque::from([literal]);
        while let Some(assigned) = pending.pop_front() {
            self.stats.num_propagations += 1;
            if let Some(conflict) = self.propagate_literal(assigned, &mut pending) {
                trace!("conflict on {:?}", &self.clauses[conflict]);
                return Some(conflict);
            }
        }
        None
    }

    /// Visits every clause watching `!assigned`
    fn propagate_literal(
        &mut self,
        assigned: Literal,
        pending: &mut VecDeque<Literal>,
    ) -> Option<ClauseRef> {
        let falsified = !assigned;
        let mut watches = std::mem::take(&mut self.watches[assigned.repr()]);
        let mut conflict = None;

        let mut i = 0;
        let mut j = 0;
        while i < watches.len() {
            let clause_ref = watches[i];
            i += 1;

            let watchers = self.clauses.watchers(clause_ref);
            debug_assert!(watchers.contains(&falsified));
            let other = if watchers[0] == falsified {
                watchers[1]
            } else {
                watchers[0]
            };

            // Satisfied through the other watcher
            if other.is_true(&self.assignments) {
                watches[j] = clause_ref;
                j += 1;
                continue;
            }

            // Move the watch to a literal that is not false
            if let Some(replacement) = self.find_replacement(clause_ref, watchers) {
                self.clauses.replace_watcher(clause_ref, falsified, replacement);
                self.watches[(!replacement).repr()].push(clause_ref);
                continue;
            }

            watches[j] = clause_ref;
            j += 1;
            if other.is_unset(&self.assignments) {
                trace!("{other} forced by {:?}", &self.clauses[clause_ref]);
                self.assign(other, Some(clause_ref));
                pending.push_back(other);
            } else {
                conflict = Some(clause_ref);
                while i < watches.len() {
                    watches[j] = watches[i];
                    i += 1;
                    j += 1;
                }
            }
        }

        watches.truncate(j);
        self.watches[assigned.repr()] = watches;
        conflict
    }

    /// A literal of the clause that is not false and not watched
    fn find_replacement(&self, clause_ref: ClauseRef, watchers: [Literal; 2]) -> Option<Literal> {
        self.clauses[clause_ref].iter().copied().find(|literal| {
            literal.var() != watchers[0].var()
                && literal.var() != watchers[1].var()
                && !literal.is_false(&self.assignments)
        })
    }
}
