use crate::solver::{
    clause::{ClauseOrigin, ClauseRef},
    literal::Literal,
    variable::Assignments,
};

/// Location of a clause inside a flat literal arena
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct ClauseSpan {
    start: usize,
    len: usize,
}

/// Append-only storage for clauses of one origin.
///
/// Literals of all clauses are kept contiguously; each clause is a span into
/// that buffer plus its pair of watched literals. Only the watchers ever
/// change after a clause was pushed.
#[derive(Clone, Debug, Default)]
pub struct ClauseArena {
    literals: Vec<Literal>,
    spans: Vec<ClauseSpan>,
    watchers: Vec<[Literal; 2]>,
}

impl ClauseArena {
    /// Number of clauses
    #[must_use]
    pub const fn len(&self) -> usize {
        self.spans.len()
    }

    /// Is empty
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of literals over all clauses
    #[must_use]
    pub const fn num_literals(&self) -> usize {
        self.literals.len()
    }

    /// Appends a clause; returns its index
    fn push(&mut self, literals: &[Literal], watchers: [Literal; 2]) -> usize {
        debug_assert!(literals.len() >= 2);
        debug_assert!(watchers[0] != watchers[1]);
        let idx = self.spans.len();
        self.spans.push(ClauseSpan {
            start: self.literals.len(),
            len: literals.len(),
        });
        self.literals.extend_from_slice(literals);
        self.watchers.push(watchers);
        idx
    }

    fn literals(&self, idx: usize) -> &[Literal] {
        let span = self.spans[idx];
        &self.literals[span.start..span.start + span.len]
    }
}

/// Outcome of storing a clause derived by conflict analysis
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Learned {
    /// Single literal; never stored, the caller asserts it at the root
    Unit(Literal),
    /// Stored clause
    Clause(ClauseRef),
}

/// Original and learned clauses, addressed uniformly through [`ClauseRef`]
#[derive(Clone, Debug, Default)]
pub struct ClauseDatabase {
    original: ClauseArena,
    learned: ClauseArena,
}

impl ClauseDatabase {
    /// Stores an original clause, watching its first two literals
    ///
    /// # Panics
    /// If the clause has fewer than two literals.
    pub fn add_clause(&mut self, literals: &[Literal]) -> ClauseRef {
        assert!(literals.len() >= 2, "stored clauses need two literals");
        let idx = self.original.push(literals, [literals[0], literals[1]]);
        ClauseRef::from_idx(idx, ClauseOrigin::Original)
    }

    /// Stores a learned clause, watching the last two literals
    ///
    /// # Panics
    /// If `literals` is empty.
    pub fn learn(&mut self, literals: &[Literal]) -> Learned {
        match literals {
            [] => panic!("cannot learn the empty clause"),
            [unit] => Learned::Unit(*unit),
            [.., second_last, last] => {
                let idx = self.learned.push(literals, [*last, *second_last]);
                Learned::Clause(ClauseRef::from_idx(idx, ClauseOrigin::Learned))
            }
        }
    }

    fn arena(&self, clause_ref: ClauseRef) -> &ClauseArena {
        match clause_ref.origin() {
            ClauseOrigin::Original => &self.original,
            ClauseOrigin::Learned => &self.learned,
        }
    }

    fn arena_mut(&mut self, clause_ref: ClauseRef) -> &mut ClauseArena {
        match clause_ref.origin() {
            ClauseOrigin::Original => &mut self.original,
            ClauseOrigin::Learned => &mut self.learned,
        }
    }

    /// Literals of a clause, in the order they were added
    #[must_use]
    pub fn literals(&self, clause_ref: ClauseRef) -> &[Literal] {
        self.arena(clause_ref).literals(clause_ref.idx())
    }

    /// Watched literals of a clause
    #[must_use]
    pub fn watchers(&self, clause_ref: ClauseRef) -> [Literal; 2] {
        self.arena(clause_ref).watchers[clause_ref.idx()]
    }

    /// Replaces watcher `old` with `new`, another literal of the same clause
    pub fn replace_watcher(&mut self, clause_ref: ClauseRef, old: Literal, new: Literal) {
        debug_assert!(self.literals(clause_ref).contains(&new));
        let watchers = &mut self.arena_mut(clause_ref).watchers[clause_ref.idx()];
        debug_assert!(!watchers.contains(&new));
        if watchers[0] == old {
            watchers[0] = new;
        } else {
            debug_assert_eq!(watchers[1], old);
            watchers[1] = new;
        }
    }

    /// Original clauses
    #[must_use]
    pub const fn original(&self) -> &ClauseArena {
        &self.original
    }

    /// Learned clauses
    #[must_use]
    pub const fn learned(&self) -> &ClauseArena {
        &self.learned
    }

    /// All clauses; original ones first
    pub fn iter(&self) -> impl Iterator<Item = ClauseRef> + use<> {
        let original = (0..self.original.len())
            .map(|idx| ClauseRef::from_idx(idx, ClauseOrigin::Original));
        let learned =
            (0..self.learned.len()).map(|idx| ClauseRef::from_idx(idx, ClauseOrigin::Learned));
        original.chain(learned)
    }

    /// Whether some literal of the clause is true
    #[must_use]
    pub fn is_satisfied(&self, clause_ref: ClauseRef, assignments: &Assignments) -> bool {
        self.literals(clause_ref)
            .iter()
            .any(|literal| literal.is_true(assignments))
    }
}

/// Clause at given reference
impl std::ops::Index<ClauseRef> for ClauseDatabase {
    type Output = [Literal];

    fn index(&self, index: ClauseRef) -> &Self::Output {
        self.literals(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lits(signed: &[i32]) -> Vec<Literal> {
        signed.iter().map(|&l| Literal::from_dimacs(l)).collect()
    }

    #[test]
    fn original_clauses_watch_their_first_two_literals() {
        let mut db = ClauseDatabase::default();
        let first = db.add_clause(&lits(&[1, -3, -8]));
        let second = db.add_clause(&lits(&[2, 11]));
        assert_eq!(db.watchers(first), [Literal::from_dimacs(1), Literal::from_dimacs(-3)]);
        assert_eq!(&db[second], lits(&[2, 11]).as_slice());
        assert_eq!(db.original().num_literals(), 5);
    }

    #[test]
    fn learned_clauses_watch_their_last_two_literals() {
        let mut db = ClauseDatabase::default();
        let Learned::Clause(clause_ref) = db.learn(&lits(&[4, -5, 6])) else {
            panic!("three literals must be stored");
        };
        assert!(clause_ref.is_learned());
        assert_eq!(db.watchers(clause_ref), [Literal::from_dimacs(6), Literal::from_dimacs(-5)]);
        assert_eq!(db.learn(&lits(&[-9])), Learned::Unit(Literal::from_dimacs(-9)));
        assert_eq!(db.learned().len(), 1);
    }

    #[test]
    fn iteration_visits_original_before_learned() {
        let mut db = ClauseDatabase::default();
        let _ = db.learn(&lits(&[1, 2]));
        let original = db.add_clause(&lits(&[3, 4]));
        let all: Vec<_> = db.iter().collect();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], original);
        assert!(all[1].is_learned());
    }

    #[test]
    fn watcher_replacement_keeps_the_other_watcher() {
        let mut db = ClauseDatabase::default();
        let clause_ref = db.add_clause(&lits(&[1, 2, 3]));
        db.replace_watcher(clause_ref, Literal::from_dimacs(1), Literal::from_dimacs(3));
        assert_eq!(db.watchers(clause_ref), [Literal::from_dimacs(3), Literal::from_dimacs(2)]);
        assert_eq!(&db[clause_ref], lits(&[1, 2, 3]).as_slice());
    }

    #[test]
    fn satisfaction_needs_a_true_literal() {
        let mut db = ClauseDatabase::default();
        let clause_ref = db.add_clause(&lits(&[1, -2]));
        let mut assignments = Assignments::default();
        assignments.grow_to(2);
        assert!(!db.is_satisfied(clause_ref, &assignments));
        assignments.assign(Literal::from_dimacs(-2), 1, None);
        assert!(db.is_satisfied(clause_ref, &assignments));
    }
}
