use crate::solver::{clause::ClauseRef, literal::Literal};

/// Which polarity of a choice point is being explored
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Branch {
    /// The default polarity; the opposite one is still untried
    First,
    /// The opposite polarity, tried after the first one failed
    Second,
}

/// What happened after the decision of a frame
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FrameOutcome {
    /// Propagation has not finished yet
    Pending,
    /// Propagation reached a fixpoint without conflict
    Success,
    /// The frame was refuted; `learned` is the clause derived for it, if any
    Conflict { learned: Option<ClauseRef> },
}

/// Observable state of a frame
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FrameState {
    FirstBranchPending,
    SecondBranchPending,
    ResolvedSuccess,
    ResolvedConflictLearned(ClauseRef),
    /// Refuted without a stored clause: a unit conflict, or a refuted subtree
    ResolvedConflictWithoutClause,
}

/// One decision and everything it forced
#[derive(Clone, Debug)]
pub struct DecisionFrame {
    decision: Literal,
    branch: Branch,
    outcome: FrameOutcome,
    propagated: Vec<Literal>,
}

impl DecisionFrame {
    fn new(decision: Literal, branch: Branch) -> Self {
        Self {
            decision,
            branch,
            outcome: FrameOutcome::Pending,
            propagated: Vec::new(),
        }
    }

    /// The decided literal
    #[must_use]
    pub const fn decision(&self) -> Literal {
        self.decision
    }

    /// Explored branch
    #[must_use]
    pub const fn branch(&self) -> Branch {
        self.branch
    }

    /// Outcome of the frame
    #[must_use]
    pub const fn outcome(&self) -> FrameOutcome {
        self.outcome
    }

    /// Literals forced by the decision, in propagation order
    #[must_use]
    pub fn propagated(&self) -> &[Literal] {
        &self.propagated
    }

    /// Marks propagation as finished without conflict
    pub fn succeed(&mut self) {
        self.outcome = FrameOutcome::Success;
    }

    /// Marks the frame as refuted
    pub fn fail(&mut self, learned: Option<ClauseRef>) {
        self.outcome = FrameOutcome::Conflict { learned };
    }

    /// State of the frame
    #[must_use]
    pub const fn state(&self) -> FrameState {
        match (self.outcome, self.branch) {
            (FrameOutcome::Pending, Branch::First) => FrameState::FirstBranchPending,
            (FrameOutcome::Pending, Branch::Second) => FrameState::SecondBranchPending,
            (FrameOutcome::Success, _) => FrameState::ResolvedSuccess,
            (FrameOutcome::Conflict { learned: Some(clause_ref) }, _) => {
                FrameState::ResolvedConflictLearned(clause_ref)
            }
            (FrameOutcome::Conflict { learned: None }, _) => {
                FrameState::ResolvedConflictWithoutClause
            }
        }
    }
}

/// Chronological stack of decision frames.
///
/// Literals asserted at the root (unit clauses, unit conflicts, and whatever
/// they imply) sit below the first frame and are never popped. Frame `i`
/// holds the assignments of decision level `i + 1`.
#[derive(Clone, Debug, Default)]
pub struct Trail {
    root: Vec<Literal>,
    frames: Vec<DecisionFrame>,
}

impl Trail {
    /// Current decision level; 0 when no frame is open
    #[must_use]
    pub fn decision_level(&self) -> usize {
        self.frames.len()
    }

    /// Whether no frame is open
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Opens a new frame for `decision`
    pub fn push(&mut self, decision: Literal, branch: Branch) {
        self.frames.push(DecisionFrame::new(decision, branch));
    }

    /// Removes the top frame
    pub fn pop(&mut self) -> Option<DecisionFrame> {
        self.frames.pop()
    }

    /// Top frame
    #[must_use]
    pub fn top(&self) -> Option<&DecisionFrame> {
        self.frames.last()
    }

    /// Top frame
    pub fn top_mut(&mut self) -> Option<&mut DecisionFrame> {
        self.frames.last_mut()
    }

    /// Records a literal that was not decided at the current level
    pub fn record(&mut self, literal: Literal) {
        match self.frames.last_mut() {
            Some(frame) => frame.propagated.push(literal),
            None => self.root.push(literal),
        }
    }

    /// Literals fixed at the root
    #[must_use]
    pub fn root(&self) -> &[Literal] {
        &self.root
    }

    /// Open frames, bottom first
    #[must_use]
    pub fn frames(&self) -> &[DecisionFrame] {
        &self.frames
    }

    /// Number of assigned literals
    #[must_use]
    pub fn num_assigned(&self) -> usize {
        self.root.len()
            + self
                .frames
                .iter()
                .map(|frame| 1 + frame.propagated.len())
                .sum::<usize>()
    }
}
