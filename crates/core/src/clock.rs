//! Time source for correction stamps and "latest" resolution
//!
//! The clock is a capability handed to the engine at construction. Tests pass
//! a `FixedClock` instead of mutating any shared time source.

use crate::contract::Timestamp;
use std::fmt::Debug;

/// Source of "now"
pub trait Clock: Send + Sync + Debug {
    /// The current instant
    fn now(&self) -> Timestamp;
}

/// Wall-clock time from the operating system
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock frozen at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(Timestamp);

impl FixedClock {
    /// Create a clock that always reports `instant`
    pub fn new(instant: Timestamp) -> Self {
        FixedClock(instant)
    }

    /// The frozen instant
    pub fn instant(&self) -> Timestamp {
        self.0
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}
