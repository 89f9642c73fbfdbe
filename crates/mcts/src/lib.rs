//! Anytime Monte Carlo Tree Search for tick-based games.
//!
//! This crate provides a UCT search that can be used with any game
//! implementing the `arcade_core::GameState` trait. Every decision builds a
//! fresh tree from the current state and stops when a wall-clock budget is
//! nearly spent, so an action is always available in time.
//!
//! # Features
//!
//! - **Generic**: Works with any `GameState` implementation
//! - **UCT Selection**: Every child is tried once before UCT picks among them
//! - **Anytime**: Polls a deadline between iterations and inside rollouts
//! - **Pluggable Evaluation**: Random rollouts plus optional heuristics
//! - **Reproducible**: The random source is injected and seedable
//!
//! # Example
//!
//! ```
//! use arcade_mcts::{games::GridChase, Mcts, MctsConfig, NpcPressure, RolloutEvaluator};
//! use arcade_core::GameState;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use std::time::Duration;
//!
//! let state = GridChase::demo();
//!
//! let config = MctsConfig::default();
//! let evaluator = RolloutEvaluator::from_config(&config).with_heuristic(NpcPressure::default());
//! let mut mcts = Mcts::new(config, evaluator, ChaCha8Rng::seed_from_u64(42));
//!
//! let action = mcts.decide(&state, Duration::from_millis(40)).expect("state has actions");
//! assert!(state.available_actions().contains(&action));
//! ```

pub mod clock;
pub mod config;
pub mod evaluator;
pub mod games;
pub mod heuristics;
mod node;
pub mod search;
mod tree;

pub use clock::Deadline;
pub use config::{DecisionRule, MctsConfig};
pub use evaluator::{Evaluator, RolloutEvaluator};
pub use heuristics::{Heuristic, NpcPressure, ResourceProgress};
pub use node::{Node, NodeId, NodeStats};
pub use search::{uct_value, ChildSummary, Mcts, SearchResult};
pub use tree::{Ancestors, Tree};
