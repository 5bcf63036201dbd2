//! Version-correction query coordinates
//!
//! A `VersionCorrection` selects exactly one record from a timeline: the
//! correction component picks the slice of beliefs, the version component
//! picks the record within that slice. Either component may be "latest".
//!
//! ## Resolution
//!
//! - Latest version resolves to the clock's "now" at query time.
//! - Latest correction resolves to the active slice (records whose correction
//!   window is still open).

use super::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A `(version, correction)` coordinate; `None` means latest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VersionCorrection {
    version: Option<Timestamp>,
    correction: Option<Timestamp>,
}

impl VersionCorrection {
    /// Latest version as seen by the latest correction
    pub const LATEST: VersionCorrection = VersionCorrection {
        version: None,
        correction: None,
    };

    /// Coordinate with both components fixed or latest
    pub const fn of(version: Option<Timestamp>, correction: Option<Timestamp>) -> Self {
        VersionCorrection {
            version,
            correction,
        }
    }

    /// Fixed version instant, latest correction
    pub const fn of_version(version: Timestamp) -> Self {
        Self::of(Some(version), None)
    }

    /// Latest version, fixed correction instant
    pub const fn of_correction(correction: Timestamp) -> Self {
        Self::of(None, Some(correction))
    }

    /// Fixed version and correction instants
    pub const fn at(version: Timestamp, correction: Timestamp) -> Self {
        Self::of(Some(version), Some(correction))
    }

    /// Version instant, `None` for latest
    #[inline]
    pub fn version(&self) -> Option<Timestamp> {
        self.version
    }

    /// Correction instant, `None` for latest
    #[inline]
    pub fn correction(&self) -> Option<Timestamp> {
        self.correction
    }

    /// True when either component still means latest
    pub fn contains_latest(&self) -> bool {
        self.version.is_none() || self.correction.is_none()
    }

    /// Replace every latest component with `now`
    pub fn with_latest_fixed(&self, now: Timestamp) -> Self {
        VersionCorrection {
            version: Some(self.version.unwrap_or(now)),
            correction: Some(self.correction.unwrap_or(now)),
        }
    }
}

impl fmt::Display for VersionCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version {
            Some(v) => write!(f, "V{}", v)?,
            None => write!(f, "VLATEST")?,
        }
        match self.correction {
            Some(c) => write!(f, ".C{}", c),
            None => write!(f, ".CLATEST"),
        }
    }
}
