//! Playing and recording one episode.

use crate::settings::ArenaConfig;
use anyhow::{Context, Result};
use arcade_core::{GameState, Outcome};
use arcade_mcts::{games::ChaseAction, games::GridChase, Mcts, RolloutEvaluator};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// A single decision in an episode.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TickRecord {
    pub tick: u32,
    pub action: ChaseAction,

    /// Search statistics for this decision.
    pub iterations: u32,
    pub nodes: usize,
    pub elapsed_us: u64,
    pub fallback: bool,

    /// Game score after the action was applied.
    pub score: f64,
}

/// A complete episode.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EpisodeRecord {
    pub steps: Vec<TickRecord>,
    pub outcome: Outcome,
    pub score: f64,

    /// Optional metadata.
    pub metadata: HashMap<String, serde_json::Value>,
}

impl EpisodeRecord {
    /// Decisions whose search finished after the budget.
    pub fn late_ticks(&self, budget: Duration) -> usize {
        let budget_us = budget.as_micros() as u64;
        self.steps
            .iter()
            .filter(|step| step.elapsed_us > budget_us)
            .count()
    }
}

/// Play `level` to the end, one budgeted decision per tick.
///
/// The evaluator is rebuilt at every tick so that resource progress is
/// measured from the position the decision starts at.
pub fn play_episode(
    config: &ArenaConfig,
    level: &GridChase,
    seed: u64,
    budget: Duration,
) -> Result<EpisodeRecord> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut state = level.clone();
    let mut steps = Vec::new();

    while !state.is_terminal() {
        let heuristic = config.heuristics.build(&state);
        let evaluator = RolloutEvaluator::from_config(&config.mcts).with_heuristic(heuristic);
        let tick_rng = ChaCha8Rng::from_rng(&mut rng).context("Failed to seed tick rng")?;
        let mut mcts = Mcts::new(config.mcts.clone(), evaluator, tick_rng);

        let result = mcts
            .search(&state, budget)
            .with_context(|| format!("Search failed at tick {}", state.tick()))?;

        state.advance(result.best_action);
        debug!(tick = state.tick(), action = ?result.best_action, score = state.score(), "tick");

        steps.push(TickRecord {
            tick: state.tick(),
            action: result.best_action,
            iterations: result.iterations,
            nodes: result.nodes,
            elapsed_us: result.elapsed.as_micros() as u64,
            fallback: result.fallback,
            score: state.score(),
        });
    }

    let mut metadata = HashMap::new();
    metadata.insert("seed".to_string(), serde_json::json!(seed));
    metadata.insert(
        "budget_ms".to_string(),
        serde_json::json!(budget.as_millis() as u64),
    );

    Ok(EpisodeRecord {
        steps,
        outcome: state.outcome(),
        score: state.score(),
        metadata,
    })
}
