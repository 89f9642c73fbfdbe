use thiserror::Error;

/// Errors that can occur when planning on a game state
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ArcadeError {
    #[error("Action index {index} out of range ({len} actions available)")]
    ActionOutOfRange { index: usize, len: usize },

    #[error("No legal actions available")]
    NoLegalActions,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid level layout: {0}")]
    InvalidLayout(String),
}

/// Convenience Result type for arcade operations
pub type Result<T> = std::result::Result<T, ArcadeError>;

/// Look up the action stored at a child slot.
///
/// Slot indices are only meaningful relative to the enumeration they came
/// from, so this is the single place where a slot is turned back into an
/// action.
pub fn action_at<A: Copy>(actions: &[A], index: usize) -> Result<A> {
    actions
        .get(index)
        .copied()
        .ok_or(ArcadeError::ActionOutOfRange {
            index,
            len: actions.len(),
        })
}
