//! Pluggable static adjustments added to a rollout's final value.
//!
//! A heuristic only reads the state. Games without spatial data use `()`,
//! which contributes nothing.

use arcade_core::{EntityKind, Spatial};

/// A scalar adjustment to the value of a simulated state.
pub trait Heuristic<S> {
    fn adjust(&self, state: &S) -> f64;
}

impl<S> Heuristic<S> for () {
    fn adjust(&self, _state: &S) -> f64 {
        0.0
    }
}

/// Two heuristics applied together; their adjustments add up.
impl<S, A, B> Heuristic<S> for (A, B)
where
    A: Heuristic<S>,
    B: Heuristic<S>,
{
    fn adjust(&self, state: &S) -> f64 {
        self.0.adjust(state) + self.1.adjust(state)
    }
}

/// Penalizes states with many NPCs around, and states where the avatar
/// is far from the closest one.
///
/// The distance term pushes the agent to engage instead of hiding in a
/// corner. With no NPCs (or no avatar) the penalty is zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NpcPressure {
    pub count_weight: f64,
    pub distance_weight: f64,
}

impl Default for NpcPressure {
    fn default() -> Self {
        Self {
            count_weight: 2.0,
            distance_weight: 1.0,
        }
    }
}

impl<S: Spatial> Heuristic<S> for NpcPressure {
    fn adjust(&self, state: &S) -> f64 {
        let count = state.entity_count(EntityKind::Npc);
        if count == 0 {
            return 0.0;
        }
        let distance = state.nearest_distance(EntityKind::Npc).unwrap_or(0.0);
        -(self.count_weight * count as f64 + self.distance_weight * distance)
    }
}

/// Rewards the fraction of resources collected since the decision began.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResourceProgress {
    baseline: usize,
    weight: f64,
}

impl ResourceProgress {
    pub fn new(baseline: usize, weight: f64) -> Self {
        Self { baseline, weight }
    }

    /// Use the number of resources in `state` as the baseline.
    pub fn from_state<S: Spatial>(state: &S, weight: f64) -> Self {
        Self::new(state.entity_count(EntityKind::Resource), weight)
    }
}

impl<S: Spatial> Heuristic<S> for ResourceProgress {
    fn adjust(&self, state: &S) -> f64 {
        if self.baseline == 0 {
            return 0.0;
        }
        let remaining = state.entity_count(EntityKind::Resource) as f64;
        self.weight * (1.0 - remaining / self.baseline as f64)
    }
}
