//! Built-in games for exercising the search.
//!
//! `Counter` is small enough to reason about the exact tree the search
//! builds; `GridChase` has spatial structure for the heuristics and is
//! what the arena plays.

pub mod counter;
pub mod grid_chase;

pub use counter::{Counter, CounterAction};
pub use grid_chase::{ChaseAction, Direction, GridChase};
