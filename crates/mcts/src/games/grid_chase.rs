//! Grid chase: collect every resource, then reach the portal before an
//! NPC catches the avatar.
//!
//! NPCs step one cell toward the avatar after every second avatar move,
//! always closing the larger axis gap first. Everything is deterministic,
//! so clones that receive the same actions stay identical.
//!
//! Levels are written as ASCII:
//! ```text
//! A  avatar      N  NPC
//! R  resource    P  portal
//! .  floor
//! ```

use arcade_core::{ArcadeError, EntityKind, GameState, Outcome, Position, Result, Spatial};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Points for collecting one resource.
pub const RESOURCE_POINTS: f64 = 1.0;

/// Points for leaving through the portal.
pub const EXIT_POINTS: f64 = 10.0;

/// Ticks after which an undecided episode ends.
pub const DEFAULT_MAX_TICKS: u32 = 200;

/// NPCs move once every this many ticks.
const NPC_PERIOD: u32 = 2;

const DEMO_LEVEL: &str = "
.........
.R.....N.
.........
...A.....
.......R.
P........
";

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChaseAction {
    Move(Direction),
    Wait,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GridChase {
    width: i32,
    height: i32,
    avatar: Position,
    npcs: Vec<Position>,
    resources: Vec<Position>,
    portal: Option<Position>,
    score: f64,
    tick: u32,
    max_ticks: u32,
    outcome: Outcome,
}

impl GridChase {
    /// Parse a level from its ASCII layout.
    ///
    /// Blank lines and surrounding whitespace are ignored.
    ///
    /// # Errors
    /// Returns `ArcadeError::InvalidLayout` for ragged rows, unknown cells,
    /// a missing or duplicated avatar, or more than one portal.
    pub fn from_layout(layout: &str) -> Result<Self> {
        let rows: Vec<&str> = layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let width = rows.first().map_or(0, |row| row.chars().count());
        if width == 0 {
            return Err(ArcadeError::InvalidLayout("layout is empty".to_string()));
        }

        let mut avatar = None;
        let mut npcs = Vec::new();
        let mut resources = Vec::new();
        let mut portal = None;

        for (y, row) in rows.iter().enumerate() {
            if row.chars().count() != width {
                return Err(ArcadeError::InvalidLayout(format!(
                    "row {} has {} cells, expected {}",
                    y,
                    row.chars().count(),
                    width
                )));
            }

            for (x, cell) in row.chars().enumerate() {
                let pos = Position::new(x as i32, y as i32);
                match cell {
                    '.' => {}
                    'A' if avatar.is_some() => {
                        return Err(ArcadeError::InvalidLayout(format!(
                            "second avatar at {}",
                            pos
                        )));
                    }
                    'A' => avatar = Some(pos),
                    'N' => npcs.push(pos),
                    'R' => resources.push(pos),
                    'P' if portal.is_some() => {
                        return Err(ArcadeError::InvalidLayout(format!(
                            "second portal at {}",
                            pos
                        )));
                    }
                    'P' => portal = Some(pos),
                    other => {
                        return Err(ArcadeError::InvalidLayout(format!(
                            "unknown cell {:?} at {}",
                            other, pos
                        )));
                    }
                }
            }
        }

        let avatar =
            avatar.ok_or_else(|| ArcadeError::InvalidLayout("no avatar in layout".to_string()))?;

        Ok(Self {
            width: width as i32,
            height: rows.len() as i32,
            avatar,
            npcs,
            resources,
            portal,
            score: 0.0,
            tick: 0,
            max_ticks: DEFAULT_MAX_TICKS,
            outcome: Outcome::Ongoing,
        })
    }

    /// The level the arena plays by default.
    pub fn demo() -> Self {
        Self::from_layout(DEMO_LEVEL).expect("demo level is well formed")
    }

    pub fn with_max_ticks(mut self, max_ticks: u32) -> Self {
        self.max_ticks = max_ticks;
        self
    }

    pub fn tick(&self) -> u32 {
        self.tick
    }

    pub fn avatar(&self) -> Position {
        self.avatar
    }

    pub fn npcs(&self) -> &[Position] {
        &self.npcs
    }

    pub fn resources(&self) -> &[Position] {
        &self.resources
    }

    fn in_bounds(&self, pos: Position) -> bool {
        (0..self.width).contains(&pos.x) && (0..self.height).contains(&pos.y)
    }

    fn caught(&self) -> bool {
        self.npcs.contains(&self.avatar)
    }

    fn move_npcs(&mut self) {
        let target = self.avatar;
        for npc in &mut self.npcs {
            let dx = target.x - npc.x;
            let dy = target.y - npc.y;
            if dx != 0 && dx.abs() >= dy.abs() {
                npc.x += dx.signum();
            } else if dy != 0 {
                npc.y += dy.signum();
            }
        }
    }
}

impl GameState for GridChase {
    type Action = ChaseAction;

    /// In-bounds moves in `Direction::ALL` order, then `Wait`.
    fn available_actions(&self) -> Vec<ChaseAction> {
        if self.is_terminal() {
            return Vec::new();
        }

        let mut actions: Vec<ChaseAction> = Direction::ALL
            .into_iter()
            .filter(|dir| {
                let (dx, dy) = dir.delta();
                self.in_bounds(self.avatar.offset(dx, dy))
            })
            .map(ChaseAction::Move)
            .collect();
        actions.push(ChaseAction::Wait);
        actions
    }

    fn advance(&mut self, action: ChaseAction) {
        debug_assert!(!self.is_terminal(), "advance on a finished episode");

        if let ChaseAction::Move(dir) = action {
            let (dx, dy) = dir.delta();
            let next = self.avatar.offset(dx, dy);
            if self.in_bounds(next) {
                self.avatar = next;
            }
        }
        self.tick += 1;

        if self.caught() {
            self.outcome = Outcome::Loss;
            return;
        }

        if let Some(i) = self.resources.iter().position(|&r| r == self.avatar) {
            self.resources.swap_remove(i);
            self.score += RESOURCE_POINTS;
        }

        if self.portal == Some(self.avatar) && self.resources.is_empty() {
            self.score += EXIT_POINTS;
            self.outcome = Outcome::Win;
            return;
        }

        if self.tick % NPC_PERIOD == 0 {
            self.move_npcs();
            if self.caught() {
                self.outcome = Outcome::Loss;
            }
        }
    }

    fn is_terminal(&self) -> bool {
        self.outcome.is_decided() || self.tick >= self.max_ticks
    }

    fn score(&self) -> f64 {
        self.score
    }

    fn outcome(&self) -> Outcome {
        self.outcome
    }
}

impl Spatial for GridChase {
    fn avatar_position(&self) -> Option<Position> {
        Some(self.avatar)
    }

    fn entity_positions(&self, kind: EntityKind) -> Vec<Position> {
        match kind {
            EntityKind::Npc => self.npcs.clone(),
            EntityKind::Resource => self.resources.clone(),
            EntityKind::Portal => self.portal.into_iter().collect(),
            EntityKind::Movable => Vec::new(),
        }
    }
}

impl fmt::Display for GridChase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Position::new(x, y);
                let cell = if self.npcs.contains(&pos) {
                    'N'
                } else if pos == self.avatar {
                    'A'
                } else if self.resources.contains(&pos) {
                    'R'
                } else if self.portal == Some(pos) {
                    'P'
                } else {
                    '.'
                };
                write!(f, "{}", cell)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
