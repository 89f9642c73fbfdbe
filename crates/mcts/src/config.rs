//! MCTS configuration parameters.
//!
//! These parameters control depth, exploration, reward shaping and the
//! time margins of the anytime search loop. Defaults reproduce the
//! tuning the engine was developed with on 40ms decision ticks.

use arcade_core::{ArcadeError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the final action is read off the root's children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionRule {
    /// Child with the greatest accumulated reward.
    ///
    /// Favors heavily visited children over rarely visited ones with a
    /// better average.
    #[default]
    TotalReward,

    /// Child with the greatest reward per visit.
    MeanReward,
}

/// MCTS configuration parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Maximum tree depth, also the absolute depth at which rollouts stop.
    pub expansion_depth: usize,

    /// UCT exploration weight used while descending the tree.
    /// Rewards are in game-score units, so small weights already explore.
    pub exploration_weight: f64,

    /// No new iteration starts once less than this much time remains.
    pub iteration_margin_ms: u64,

    /// Rollouts are cut short once less than this much time remains.
    pub rollout_margin_ms: u64,

    /// Reward added when a simulated state is a win.
    pub win_reward: f64,

    /// Penalty subtracted when a simulated state is a loss.
    /// Kept well below `win_reward` so wins and losses do not cancel out
    /// when averaged at an ancestor.
    pub loss_penalty: f64,

    /// Optional cap on the number of iterations per search.
    /// `None` means the time budget is the only limit.
    pub max_iterations: Option<u32>,

    /// Rule used to pick the final action at the root.
    pub decision_rule: DecisionRule,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            expansion_depth: 25,
            exploration_weight: 0.1,
            iteration_margin_ms: 3,
            rollout_margin_ms: 5,
            win_reward: 100_000.0,
            loss_penalty: 5_000.0,
            max_iterations: None,
            decision_rule: DecisionRule::TotalReward,
        }
    }
}

impl MctsConfig {
    /// Create a config that stops after a fixed number of iterations
    /// (or earlier, if the time budget runs out first).
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            max_iterations: Some(iterations),
            ..Default::default()
        }
    }

    pub fn iteration_margin(&self) -> Duration {
        Duration::from_millis(self.iteration_margin_ms)
    }

    pub fn rollout_margin(&self) -> Duration {
        Duration::from_millis(self.rollout_margin_ms)
    }

    /// Check that every parameter is usable by the search.
    ///
    /// # Errors
    /// Returns `ArcadeError::InvalidConfig` naming the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.expansion_depth == 0 {
            return Err(ArcadeError::InvalidConfig(
                "expansion_depth must be at least 1".to_string(),
            ));
        }

        if !self.exploration_weight.is_finite() || self.exploration_weight < 0.0 {
            return Err(ArcadeError::InvalidConfig(format!(
                "exploration_weight {} must be finite and non-negative",
                self.exploration_weight
            )));
        }

        for (name, value) in [
            ("win_reward", self.win_reward),
            ("loss_penalty", self.loss_penalty),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ArcadeError::InvalidConfig(format!(
                    "{} {} must be finite and non-negative",
                    name, value
                )));
            }
        }

        if self.max_iterations == Some(0) {
            return Err(ArcadeError::InvalidConfig(
                "max_iterations must be at least 1 when set".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MctsConfig::default();
        assert_eq!(config.expansion_depth, 25);
        assert!((config.exploration_weight - 0.1).abs() < 1e-12);
        assert_eq!(config.iteration_margin(), Duration::from_millis(3));
        assert_eq!(config.rollout_margin(), Duration::from_millis(5));
        assert_eq!(config.win_reward, 100_000.0);
        assert_eq!(config.loss_penalty, 5_000.0);
        assert_eq!(config.max_iterations, None);
        assert_eq!(config.decision_rule, DecisionRule::TotalReward);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_with_iterations() {
        let config = MctsConfig::with_iterations(50);
        assert_eq!(config.max_iterations, Some(50));
        // Other values should be default
        assert_eq!(config.expansion_depth, 25);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = MctsConfig::default();
        config.expansion_depth = 0;
        assert!(config.validate().is_err());

        let mut config = MctsConfig::default();
        config.exploration_weight = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = MctsConfig::default();
        config.loss_penalty = -1.0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("loss_penalty"));

        let config = MctsConfig::with_iterations(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: MctsConfig = toml::from_str(
            r#"
            exploration_weight = 1.4
            decision_rule = "mean_reward"
            "#,
        )
        .unwrap();

        assert!((config.exploration_weight - 1.4).abs() < 1e-12);
        assert_eq!(config.decision_rule, DecisionRule::MeanReward);
        assert_eq!(config.expansion_depth, 25);
        assert_eq!(config.max_iterations, None);
    }
}
