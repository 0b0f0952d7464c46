use clap::ValueEnum;

use crate::solver::{
    activity::{ActivityPolicy, ConstantActivity, Vsids},
    restart::{LubyRestart, NeverRestart, RestartPolicy},
};

/// Factor an activity increment is divided by after each conflict
pub const DEFAULT_ACTIVITY_DECAY: f64 = 0.95;
/// Initial activity increment
pub const DEFAULT_ACTIVITY_BUMP: f64 = 1.0;
/// The base restart interval
pub const RESTART_FIRST: usize = 100;
/// Number of conflicts between two progress lines
pub const PROGRESS_LOG_INTERVAL: usize = 2000;

/// Verbosity level enum
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum VerbosityLevel {
    #[default]
    OnlyResult = 0,
    All = 1,
}

/// Activity policy selection
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, ValueEnum)]
pub enum ActivityKind {
    /// All variables keep their initial score
    #[default]
    Constant,
    /// Bump conflict variables and decay older bumps
    Vsids,
}

/// Restart policy selection
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, ValueEnum)]
pub enum RestartKind {
    /// Never unwind to the root on its own
    #[default]
    Never,
    /// Restart following the Luby sequence
    Luby,
}

/// Solver configuration
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SolverOptions {
    /// Whether progress lines are logged during search
    pub verbosity: VerbosityLevel,
    /// Which activity policy to install
    pub activity: ActivityKind,
    /// Decay factor used by [`ActivityKind::Vsids`]
    pub activity_decay: f64,
    /// Initial bump used by [`ActivityKind::Vsids`]
    pub activity_bump: f64,
    /// Which restart policy to install
    pub restarts: RestartKind,
    /// Base interval used by [`RestartKind::Luby`]
    pub restart_interval: usize,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            verbosity: VerbosityLevel::default(),
            activity: ActivityKind::default(),
            activity_decay: DEFAULT_ACTIVITY_DECAY,
            activity_bump: DEFAULT_ACTIVITY_BUMP,
            restarts: RestartKind::default(),
            restart_interval: RESTART_FIRST,
        }
    }
}

impl SolverOptions {
    pub(crate) fn activity_policy(&self) -> Box<dyn ActivityPolicy> {
        match self.activity {
            ActivityKind::Constant => Box::new(ConstantActivity),
            ActivityKind::Vsids => Box::new(Vsids::new(self.activity_decay, self.activity_bump)),
        }
    }

    pub(crate) fn restart_policy(&self) -> Box<dyn RestartPolicy> {
        match self.restarts {
            RestartKind::Never => Box::new(NeverRestart),
            RestartKind::Luby => Box::new(LubyRestart::new(self.restart_interval)),
        }
    }
}
