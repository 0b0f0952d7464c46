/// Decides when the search unwinds to the root
pub trait RestartPolicy {
    /// Asked after each resolved conflict
    fn should_restart(&mut self, conflicts_since_restart: usize) -> bool;
    /// Called once a restart happened
    fn on_restart(&mut self) {}
}

/// Keeps searching from the current trail forever
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverRestart;

impl RestartPolicy for NeverRestart {
    fn should_restart(&mut self, _conflicts_since_restart: usize) -> bool {
        false
    }
}

/// Restarts after `luby(i) * base` conflicts in the `i`-th run
#[derive(Clone, Copy, Debug)]
pub struct LubyRestart {
    base: usize,
    restarts: usize,
}

impl LubyRestart {
    /// New policy with the given base interval
    #[must_use]
    pub fn new(base: usize) -> Self {
        assert!(base > 0, "restart interval must be positive");
        Self { base, restarts: 0 }
    }
}

impl RestartPolicy for LubyRestart {
    fn should_restart(&mut self, conflicts_since_restart: usize) -> bool {
        conflicts_since_restart >= luby(self.restarts) * self.base
    }

    fn on_restart(&mut self) {
        self.restarts += 1;
    }
}

/// Luby restart sequence (Luby, Sinclair, Zuckerman 1993);
/// `1,1,2,1,1,2,4,1,1,2,1,1,2,4,8,...`
#[must_use]
pub fn luby(idx: usize) -> usize {
    let mut size = 1;
    let mut seq = 0;
    let mut x = idx;

    while size < x + 1 {
        seq += 1;
        size = 2 * size + 1;
    }

    while size - 1 != x {
        size = (size - 1) >> 1;
        seq -= 1;
        x %= size;
    }

    2usize.pow(seq)
}
