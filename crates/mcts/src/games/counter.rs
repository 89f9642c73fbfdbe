//! Two-action counting game.
//!
//! `Increment` bumps a counter and the game is won when it reaches the
//! target. `Stop` ends the game immediately with a loss. Every
//! non-terminal state offers both actions, so the search tree is a
//! binary comb whose only winning leaf sits at depth `target`.

use arcade_core::{GameState, Outcome};
use serde::{Deserialize, Serialize};

/// Default counter value that wins the game.
pub const DEFAULT_TARGET: u8 = 3;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum CounterAction {
    Increment,
    Stop,
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Counter {
    count: u8,
    target: u8,
    stopped: bool,
}

impl Counter {
    pub fn new() -> Self {
        Self::with_target(DEFAULT_TARGET)
    }

    pub fn with_target(target: u8) -> Self {
        Self {
            count: 0,
            target,
            stopped: false,
        }
    }

    pub fn count(&self) -> u8 {
        self.count
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for Counter {
    type Action = CounterAction;

    fn available_actions(&self) -> Vec<CounterAction> {
        if self.is_terminal() {
            Vec::new()
        } else {
            vec![CounterAction::Increment, CounterAction::Stop]
        }
    }

    fn advance(&mut self, action: CounterAction) {
        match action {
            CounterAction::Increment => self.count += 1,
            CounterAction::Stop => self.stopped = true,
        }
    }

    fn is_terminal(&self) -> bool {
        self.stopped || self.count >= self.target
    }

    fn score(&self) -> f64 {
        0.0
    }

    fn outcome(&self) -> Outcome {
        if self.count >= self.target {
            Outcome::Win
        } else if self.stopped {
            Outcome::Loss
        } else {
            Outcome::Ongoing
        }
    }
}
