//! Wall-clock budget for one decision.
//!
//! The search never blocks or sleeps. It polls the deadline before each
//! iteration and inside rollouts, and stops cooperatively.

use std::time::{Duration, Instant};

/// A fixed point in monotonic time by which a decision must be returned.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    start: Instant,
    budget: Duration,
}

impl Deadline {
    /// Start a deadline that expires `budget` from now.
    pub fn new(budget: Duration) -> Self {
        Self::starting_at(Instant::now(), budget)
    }

    pub fn starting_at(start: Instant, budget: Duration) -> Self {
        Self { start, budget }
    }

    /// A deadline far enough away to never interrupt a test search.
    pub fn unbounded() -> Self {
        Self::new(Duration::from_secs(60 * 60))
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time left before the deadline, zero once it has passed.
    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.elapsed())
    }

    /// True while strictly more than `margin` remains.
    pub fn has_at_least(&self, margin: Duration) -> bool {
        self.remaining() > margin
    }

    pub fn is_expired(&self) -> bool {
        self.remaining().is_zero()
    }
}
