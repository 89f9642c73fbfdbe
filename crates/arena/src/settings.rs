//! Arena configuration.
//!
//! Loaded from a TOML file; every section and field is optional and falls
//! back to the built-in defaults.

use anyhow::{Context, Result};
use arcade_core::Spatial;
use arcade_mcts::{games::GridChase, MctsConfig, NpcPressure, ResourceProgress};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub mcts: MctsConfig,
    pub heuristics: HeuristicConfig,
    pub level: LevelConfig,
}

/// Weights of the evaluation heuristics. A zero weight disables a term.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeuristicConfig {
    pub npc_count_weight: f64,
    pub npc_distance_weight: f64,
    pub resource_weight: f64,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        let pressure = NpcPressure::default();
        Self {
            npc_count_weight: pressure.count_weight,
            npc_distance_weight: pressure.distance_weight,
            resource_weight: 2.0,
        }
    }
}

impl HeuristicConfig {
    /// Build the heuristic pair for one decision taken at `state`.
    pub fn build(&self, state: &impl Spatial) -> (NpcPressure, ResourceProgress) {
        (
            NpcPressure {
                count_weight: self.npc_count_weight,
                distance_weight: self.npc_distance_weight,
            },
            ResourceProgress::from_state(state, self.resource_weight),
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// ASCII layout; the demo level when absent.
    pub layout: Option<String>,
    pub max_ticks: u32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            layout: None,
            max_ticks: arcade_mcts::games::grid_chase::DEFAULT_MAX_TICKS,
        }
    }
}

impl LevelConfig {
    pub fn build(&self) -> Result<GridChase> {
        let level = match &self.layout {
            Some(layout) => GridChase::from_layout(layout).context("Failed to parse level layout")?,
            None => GridChase::demo(),
        };
        Ok(level.with_max_ticks(self.max_ticks))
    }
}

impl ArenaConfig {
    /// Load from `path`, or use defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                info!("Loading config from {}", path.display());
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config file: {:?}", path))?;
                toml::from_str(&content)
                    .with_context(|| format!("Failed to parse config file: {:?}", path))?
            }
            None => {
                debug!("No config file given, using built-in defaults");
                Self::default()
            }
        };

        config.mcts.validate().context("Invalid [mcts] section")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arcade_mcts::DecisionRule;

    #[test]
    fn test_defaults() {
        let config = ArenaConfig::default();
        assert_eq!(config.mcts, MctsConfig::default());
        assert_eq!(config.heuristics.npc_count_weight, 2.0);
        assert_eq!(config.level.max_ticks, 200);
        assert!(config.level.build().is_ok());
    }

    #[test]
    fn test_parse_sections() {
        let config: ArenaConfig = toml::from_str(
            r#"
            [mcts]
            expansion_depth = 10
            decision_rule = "mean_reward"

            [level]
            layout = "A.P"
            max_ticks = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.mcts.expansion_depth, 10);
        assert_eq!(config.mcts.decision_rule, DecisionRule::MeanReward);
        assert_eq!(config.heuristics, HeuristicConfig::default());

        let level = config.level.build().unwrap();
        assert_eq!(level.avatar(), arcade_core::Position::new(0, 0));
    }

    #[test]
    fn test_bad_layout_is_reported() {
        let level = LevelConfig {
            layout: Some("??".to_string()),
            max_ticks: 5,
        };
        let err = level.build().unwrap_err();
        assert!(format!("{:#}", err).contains("unknown cell"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ArenaConfig::load(Some(Path::new("/nonexistent/arena.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_config_prints_as_toml() {
        let text = toml::to_string_pretty(&ArenaConfig::default()).unwrap();
        let back: ArenaConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, ArenaConfig::default());
    }
}
