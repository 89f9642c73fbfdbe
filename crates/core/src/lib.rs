//! Arcade Core - state-snapshot abstractions for tick-based game agents
//!
//! This crate provides the traits a game must implement so that a search
//! engine can plan on it without knowing anything else about the game.
//!
//! # Types
//!
//! - [`GameState`] - Cloneable snapshot with action enumeration and transitions
//! - [`Outcome`] - Win/loss/ongoing status of a snapshot
//! - [`Spatial`] - Optional positional queries used by evaluation heuristics
//! - [`Position`] / [`EntityKind`] - Grid geometry for those queries

mod error;
mod game;
mod types;

pub use error::{action_at, ArcadeError, Result};
pub use game::{GameState, Outcome};
pub use types::{EntityKind, Position, Spatial};
