use log::trace;

use crate::solver::{order::VariableOrder, variable::Variable};

/// Scores above this trigger a rescale of all activities
const RESCALE_LIMIT: f64 = 1e100;

/// Adjusts variable activities after each conflict
pub trait ActivityPolicy {
    /// Called once per analysed conflict with every variable the analysis
    /// walked over
    fn on_conflict(&mut self, involved: &[Variable], order: &mut VariableOrder);
}

/// Leaves every activity at its initial value
#[derive(Clone, Copy, Debug, Default)]
pub struct ConstantActivity;

impl ActivityPolicy for ConstantActivity {
    fn on_conflict(&mut self, _involved: &[Variable], _order: &mut VariableOrder) {}
}

/// Variable state independent decaying sum.
///
/// Involved variables are bumped by the current increment; the increment grows
/// by `1 / decay` per conflict, which decays older bumps relative to new ones.
#[derive(Clone, Copy, Debug)]
pub struct Vsids {
    decay: f64,
    increment: f64,
}

impl Vsids {
    /// New policy; `decay` must lie in `(0, 1]`
    #[must_use]
    pub fn new(decay: f64, bump: f64) -> Self {
        assert!(decay > 0.0 && decay <= 1.0, "activity decay must lie in (0, 1]");
        assert!(bump > 0.0, "activity bump must be positive");
        Self {
            decay,
            increment: bump,
        }
    }

    /// Amount the next bump adds
    #[must_use]
    pub const fn increment(&self) -> f64 {
        self.increment
    }
}

impl ActivityPolicy for Vsids {
    fn on_conflict(&mut self, involved: &[Variable], order: &mut VariableOrder) {
        for &variable in involved {
            if order.bump(variable, self.increment) > RESCALE_LIMIT {
                trace!("rescaling activities");
                order.rescale(1.0 / RESCALE_LIMIT);
                self.increment /= RESCALE_LIMIT;
            }
        }
        self.increment /= self.decay;
    }
}
