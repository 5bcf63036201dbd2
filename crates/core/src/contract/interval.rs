//! Half-open time intervals
//!
//! A `TimeInterval` is `[from, to)` where `to` may be unbounded. It is used for
//! both the version-time and the correction-time extent of a record.
//!
//! ## Ordering
//!
//! `Boundary::Unbounded` sorts after every finite instant, so interval
//! comparisons never need to special-case open-ended records.
//!
//! ## Invariants
//!
//! - `from < to` for every constructed interval
//! - Zero-length and inverted intervals fail construction with
//!   `MasterError::InvalidInterval`

use super::Timestamp;
use crate::error::{MasterError, MasterResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Upper end of an interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Boundary {
    /// Ends (exclusively) at this instant
    At(Timestamp),
    /// Open-ended
    Unbounded,
}

impl Boundary {
    /// The finite instant, if any
    #[inline]
    pub fn instant(&self) -> Option<Timestamp> {
        match self {
            Boundary::At(ts) => Some(*ts),
            Boundary::Unbounded => None,
        }
    }

    /// True for the open end
    #[inline]
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Boundary::Unbounded)
    }
}

impl From<Timestamp> for Boundary {
    fn from(ts: Timestamp) -> Self {
        Boundary::At(ts)
    }
}

impl From<Option<Timestamp>> for Boundary {
    /// `None` means open-ended
    fn from(ts: Option<Timestamp>) -> Self {
        ts.map_or(Boundary::Unbounded, Boundary::At)
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::At(ts) => write!(f, "{}", ts),
            Boundary::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Wire form: `{"from": micros, "to": micros | null}`
#[derive(Serialize, Deserialize)]
struct IntervalRepr {
    from: Timestamp,
    to: Option<Timestamp>,
}

/// Half-open interval `[from, to)` on one time axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "IntervalRepr", into = "IntervalRepr")]
pub struct TimeInterval {
    from: Timestamp,
    to: Boundary,
}

impl TimeInterval {
    /// Create `[from, to)`, rejecting zero-length and inverted intervals
    pub fn new(from: Timestamp, to: impl Into<Boundary>) -> MasterResult<Self> {
        let to = to.into();
        if to <= Boundary::At(from) {
            return Err(MasterError::InvalidInterval { from, to });
        }
        Ok(TimeInterval { from, to })
    }

    /// Create the open-ended interval `[from, ∞)`
    pub fn open(from: Timestamp) -> Self {
        TimeInterval {
            from,
            to: Boundary::Unbounded,
        }
    }

    /// Create `[from, to)` with a finite end
    pub fn bounded(from: Timestamp, to: Timestamp) -> MasterResult<Self> {
        Self::new(from, Boundary::At(to))
    }

    /// Inclusive lower bound
    #[inline]
    pub fn from(&self) -> Timestamp {
        self.from
    }

    /// Exclusive upper bound
    #[inline]
    pub fn to(&self) -> Boundary {
        self.to
    }

    /// Exclusive upper bound as an instant, `None` when open-ended
    #[inline]
    pub fn to_instant(&self) -> Option<Timestamp> {
        self.to.instant()
    }

    /// True when the interval has no upper bound
    #[inline]
    pub fn is_open_ended(&self) -> bool {
        self.to.is_unbounded()
    }

    /// Length of a bounded interval
    pub fn duration(&self) -> Option<Duration> {
        self.to
            .instant()
            .and_then(|to| to.duration_since(self.from))
    }

    /// True when `instant` lies in `[from, to)`
    #[inline]
    pub fn contains(&self, instant: Timestamp) -> bool {
        self.from <= instant && Boundary::At(instant) < self.to
    }

    /// True when the two intervals share at least one instant
    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        Boundary::At(self.from) < other.to && Boundary::At(other.from) < self.to
    }

    /// True when one interval ends exactly where the other starts
    pub fn is_adjacent_to(&self, other: &TimeInterval) -> bool {
        self.to == Boundary::At(other.from) || other.to == Boundary::At(self.from)
    }

    /// True when `other` lies entirely inside this interval
    pub fn encloses(&self, other: &TimeInterval) -> bool {
        self.from <= other.from && other.to <= self.to
    }

    /// The shared part of two intervals, if any
    pub fn intersection(&self, other: &TimeInterval) -> Option<TimeInterval> {
        let from = self.from.max(other.from);
        let to = self.to.min(other.to);
        TimeInterval::new(from, to).ok()
    }

    /// Clamp this interval into `[lower, upper)`
    ///
    /// Fails with `InvalidInterval` if nothing remains after clamping.
    pub fn clamp_to(&self, lower: Timestamp, upper: impl Into<Boundary>) -> MasterResult<Self> {
        let from = self.from.max(lower);
        let to = self.to.min(upper.into());
        TimeInterval::new(from, to)
    }

    /// Same interval with a different lower bound
    pub fn with_from(&self, from: Timestamp) -> MasterResult<Self> {
        TimeInterval::new(from, self.to)
    }

    /// Same interval with a different upper bound
    pub fn with_to(&self, to: impl Into<Boundary>) -> MasterResult<Self> {
        TimeInterval::new(self.from, to)
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.from, self.to)
    }
}

impl TryFrom<IntervalRepr> for TimeInterval {
    type Error = MasterError;

    fn try_from(repr: IntervalRepr) -> MasterResult<Self> {
        TimeInterval::new(repr.from, repr.to)
    }
}

impl From<TimeInterval> for IntervalRepr {
    fn from(interval: TimeInterval) -> Self {
        IntervalRepr {
            from: interval.from,
            to: interval.to.instant(),
        }
    }
}
