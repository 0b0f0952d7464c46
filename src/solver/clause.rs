/// Which arena a clause is stored in
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ClauseOrigin {
    /// Added through the clause ingestion API
    Original,
    /// Derived by conflict analysis or supplied as a theory lemma
    Learned,
}

/// Clause reference type
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ClauseRef {
    /// Even values are original clauses; odd values are learned clauses
    repr: usize,
}

impl ClauseRef {
    /// New clause reference
    #[must_use]
    pub const fn from_idx(idx: usize, origin: ClauseOrigin) -> Self {
        let learned = matches!(origin, ClauseOrigin::Learned);
        ClauseRef {
            repr: 2 * idx + learned as usize,
        }
    }

    /// Index inside the clause's arena
    #[must_use]
    pub const fn idx(&self) -> usize {
        self.repr >> 1
    }
    /// Arena the clause lives in
    #[must_use]
    pub const fn origin(&self) -> ClauseOrigin {
        if self.is_learned() {
            ClauseOrigin::Learned
        } else {
            ClauseOrigin::Original
        }
    }
    /// Whether clause is learned
    #[must_use]
    pub const fn is_learned(&self) -> bool {
        (self.repr & 1) != 0
    }
}
