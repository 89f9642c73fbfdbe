//! Evaluation abstraction for MCTS.
//!
//! The `Evaluator` trait turns a freshly expanded (or leaf) node's state
//! into a scalar reward. `RolloutEvaluator` plays random moves up to the
//! depth cap, then scores whatever state it reached.

use crate::{clock::Deadline, config::MctsConfig, heuristics::Heuristic};
use arcade_core::{GameState, Outcome};
use rand::Rng;
use std::time::Duration;

/// Trait for assigning a reward to a search node.
///
/// The reward is a raw sum; it is never divided by visit counts here.
/// Implementations must return promptly once `deadline` is close.
pub trait Evaluator<S: GameState> {
    /// Evaluate `state`, which sits at tree depth `depth`.
    fn evaluate<R: Rng + ?Sized>(
        &self,
        state: &S,
        depth: usize,
        deadline: &Deadline,
        rng: &mut R,
    ) -> f64;
}

/// Evaluator using uniform random playouts and a static value.
///
/// Value of the reached state is
/// `win_reward` (on a win) or `-loss_penalty` (on a loss), plus the game
/// score, plus the heuristic adjustment.
#[derive(Clone, Debug)]
pub struct RolloutEvaluator<H = ()> {
    /// Absolute depth at which rollouts stop.
    expansion_depth: usize,

    /// Rollouts stop once no more than this much time remains.
    rollout_margin: Duration,

    win_reward: f64,
    loss_penalty: f64,
    heuristic: H,
}

impl RolloutEvaluator<()> {
    /// Create an evaluator with no heuristic adjustment.
    pub fn from_config(config: &MctsConfig) -> Self {
        Self {
            expansion_depth: config.expansion_depth,
            rollout_margin: config.rollout_margin(),
            win_reward: config.win_reward,
            loss_penalty: config.loss_penalty,
            heuristic: (),
        }
    }
}

impl Default for RolloutEvaluator<()> {
    fn default() -> Self {
        Self::from_config(&MctsConfig::default())
    }
}

impl<H> RolloutEvaluator<H> {
    /// Replace the heuristic adjustment.
    pub fn with_heuristic<H2>(self, heuristic: H2) -> RolloutEvaluator<H2> {
        RolloutEvaluator {
            expansion_depth: self.expansion_depth,
            rollout_margin: self.rollout_margin,
            win_reward: self.win_reward,
            loss_penalty: self.loss_penalty,
            heuristic,
        }
    }

    /// Play uniformly random actions from a copy of `state`.
    ///
    /// Stops at a terminal state, at `expansion_depth`, or when the
    /// deadline is within the rollout margin. Returns the reached state
    /// and the depth it was reached at.
    pub fn rollout<S, R>(
        &self,
        state: &S,
        depth: usize,
        deadline: &Deadline,
        rng: &mut R,
    ) -> (S, usize)
    where
        S: GameState,
        R: Rng + ?Sized,
    {
        let mut state = state.clone();
        let mut depth = depth;

        while depth < self.expansion_depth
            && deadline.has_at_least(self.rollout_margin)
            && !state.is_terminal()
        {
            let actions = state.available_actions();
            if actions.is_empty() {
                break;
            }

            let action = actions[rng.gen_range(0..actions.len())];
            state.advance(action);
            depth += 1;
        }

        (state, depth)
    }

    /// Static value of a state, without any playout.
    pub fn value_of<S>(&self, state: &S) -> f64
    where
        S: GameState,
        H: Heuristic<S>,
    {
        let outcome_bonus = match state.outcome() {
            Outcome::Win => self.win_reward,
            Outcome::Loss => -self.loss_penalty,
            Outcome::Ongoing => 0.0,
        };
        outcome_bonus + state.score() + self.heuristic.adjust(state)
    }
}

impl<S, H> Evaluator<S> for RolloutEvaluator<H>
where
    S: GameState,
    H: Heuristic<S>,
{
    fn evaluate<R: Rng + ?Sized>(
        &self,
        state: &S,
        depth: usize,
        deadline: &Deadline,
        rng: &mut R,
    ) -> f64 {
        let (reached, _) = self.rollout(state, depth, deadline, rng);
        self.value_of(&reached)
    }
}
