use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Result of a game from the agent's point of view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// The game has not been decided yet.
    #[default]
    Ongoing,
    /// The agent won.
    Win,
    /// The agent lost.
    Loss,
}

impl Outcome {
    /// True once the game has a winner or loser.
    pub fn is_decided(self) -> bool {
        !matches!(self, Outcome::Ongoing)
    }
}

/// A snapshot of one game position that a search engine can plan on.
///
/// Implementations must make `clone` a deep copy: advancing a clone must
/// never change what any other clone reports. The search clones before
/// every mutation, so sibling branches never share state.
pub trait GameState: Clone {
    /// A game action (e.g., a movement direction)
    type Action: Clone + Copy + Eq + Debug;

    /// Returns all legal actions from this state.
    ///
    /// The order must be stable for a given state, since search nodes
    /// refer to actions by their index in this list. An empty list is valid
    /// and marks a stuck or finished position.
    fn available_actions(&self) -> Vec<Self::Action>;

    /// Applies an action in place.
    ///
    /// The action must come from `available_actions()` of this state.
    fn advance(&mut self, action: Self::Action);

    /// Returns true if the game has ended
    fn is_terminal(&self) -> bool;

    /// Raw game score at this state
    fn score(&self) -> f64;

    /// Win/loss status at this state
    fn outcome(&self) -> Outcome;
}
