use std::{
    cmp::{Ordering, Reverse},
    collections::BTreeSet,
};

use crate::solver::variable::Variable;

/// Activity every variable starts with
pub const INITIAL_ACTIVITY: f64 = 1.0;

/// Activity score with a total order
#[derive(Clone, Copy, Debug)]
struct Activity(f64);

impl PartialEq for Activity {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Activity {}

impl PartialOrd for Activity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Activity {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Branching order over the free variables.
///
/// Holds exactly the free variables, ordered by descending activity and then
/// by ascending variable id, so the next decision is always deterministic.
/// Scores of assigned variables are remembered and used again once they are
/// reinserted.
#[derive(Clone, Debug)]
pub struct VariableOrder {
    queue: BTreeSet<(Reverse<Activity>, Variable)>,
    activity: Vec<f64>,
}

impl Default for VariableOrder {
    fn default() -> Self {
        Self {
            queue: BTreeSet::new(),
            activity: vec![INITIAL_ACTIVITY],
        }
    }
}

impl VariableOrder {
    fn key(&self, variable: Variable) -> (Reverse<Activity>, Variable) {
        (Reverse(Activity(self.activity[variable])), variable)
    }

    /// Registers all variables up to `variable`; new ones are free
    pub fn grow_to(&mut self, variable: Variable) {
        while self.activity.len() <= variable {
            let new_variable = self.activity.len();
            self.activity.push(INITIAL_ACTIVITY);
            let _ = self.queue.insert(self.key(new_variable));
        }
    }

    /// Number of queued variables
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Whether `variable` is queued
    #[must_use]
    pub fn contains(&self, variable: Variable) -> bool {
        self.queue.contains(&self.key(variable))
    }

    /// Queues `variable`; returns whether it was absent
    pub fn insert(&mut self, variable: Variable) -> bool {
        self.queue.insert(self.key(variable))
    }

    /// Dequeues `variable`; returns whether it was present
    pub fn remove(&mut self, variable: Variable) -> bool {
        self.queue.remove(&self.key(variable))
    }

    /// Dequeues the variable with the highest activity
    pub fn pop_best(&mut self) -> Option<Variable> {
        self.queue.pop_first().map(|(_, variable)| variable)
    }

    /// Current score of `variable`
    #[must_use]
    pub fn activity(&self, variable: Variable) -> f64 {
        self.activity[variable]
    }

    /// Adds `amount` to the score of `variable`; returns the new score
    pub fn bump(&mut self, variable: Variable, amount: f64) -> f64 {
        let queued = self.remove(variable);
        self.activity[variable] += amount;
        if queued {
            let _ = self.insert(variable);
        }
        self.activity[variable]
    }

    /// Multiplies every score by `factor`
    pub fn rescale(&mut self, factor: f64) {
        debug_assert!(factor > 0.0);
        let queued: Vec<Variable> = self.queue.iter().map(|&(_, variable)| variable).collect();
        for score in self.activity.iter_mut().skip(1) {
            *score *= factor;
        }
        self.queue = queued.into_iter().map(|variable| self.key(variable)).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_scores_pop_smallest_variable_first() {
        let mut order = VariableOrder::default();
        order.grow_to(3);
        assert_eq!(order.len(), 3);
        assert_eq!(order.pop_best(), Some(1));
        assert_eq!(order.pop_best(), Some(2));
        assert_eq!(order.pop_best(), Some(3));
        assert_eq!(order.pop_best(), None);
    }

    #[test]
    fn bumped_variables_are_preferred() {
        let mut order = VariableOrder::default();
        order.grow_to(4);
        let _ = order.bump(3, 2.0);
        assert_eq!(order.activity(3), 3.0);
        assert_eq!(order.pop_best(), Some(3));
        assert_eq!(order.pop_best(), Some(1));
    }

    #[test]
    fn bumping_an_assigned_variable_keeps_it_out_of_the_queue() {
        let mut order = VariableOrder::default();
        order.grow_to(2);
        assert!(order.remove(2));
        let _ = order.bump(2, 5.0);
        assert!(!order.contains(2));
        assert!(order.insert(2));
        assert_eq!(order.pop_best(), Some(2));
    }

    #[test]
    fn rescaling_keeps_order_and_membership() {
        let mut order = VariableOrder::default();
        order.grow_to(3);
        let _ = order.bump(2, 1.0);
        assert!(order.remove(1));
        order.rescale(0.5);
        assert_eq!(order.activity(2), 1.0);
        assert_eq!(order.activity(1), 0.5);
        assert!(!order.contains(1));
        assert_eq!(order.len(), 2);
        assert_eq!(order.pop_best(), Some(2));
    }
}
