//! Grid geometry for heuristic queries.
//!
//! Heuristics only need to know where the agent is and where the other
//! entities are. Every query has a neutral answer (no position, no
//! entities) so games without spatial structure can ignore this module.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A cell on the game grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another cell.
    pub fn distance(self, other: Position) -> f64 {
        let dx = f64::from(self.x - other.x);
        let dy = f64::from(self.y - other.y);
        dx.hypot(dy)
    }

    /// Cell shifted by the given offset.
    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Category of non-avatar entity on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Adversarial non-player characters
    Npc,
    /// Collectable resources
    Resource,
    /// Exits and teleporters
    Portal,
    /// Pushable or moving objects
    Movable,
}

/// Optional positional queries on a game state.
///
/// A missing avatar or an empty category is a normal answer, never an
/// error: heuristics treat it as a zero contribution.
pub trait Spatial {
    /// Position of the agent, if it is on the grid.
    fn avatar_position(&self) -> Option<Position>;

    /// Positions of every entity of the given kind.
    fn entity_positions(&self, kind: EntityKind) -> Vec<Position>;

    /// Number of entities of the given kind.
    fn entity_count(&self, kind: EntityKind) -> usize {
        self.entity_positions(kind).len()
    }

    /// Distance from the avatar to the closest entity of the given kind.
    ///
    /// Returns `None` when the avatar is missing or the category is empty.
    fn nearest_distance(&self, kind: EntityKind) -> Option<f64> {
        let avatar = self.avatar_position()?;
        self.entity_positions(kind)
            .into_iter()
            .map(|p| avatar.distance(p))
            .min_by(|a, b| a.total_cmp(b))
    }
}
