//! Replacement documents for splices
//!
//! A replacement is a payload plus the version-time shape the caller wants.
//! Lists are taken in caller order and never sorted; `validate_replacements`
//! checks that the order already describes a contiguous run.

use masterdb_core::{Boundary, MasterError, MasterResult, Timestamp};
use serde::{Deserialize, Serialize};

/// One new version supplied to a splice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replacement<T> {
    /// Entity snapshot
    pub payload: T,
    /// Requested start of the version interval
    pub version_from: Timestamp,
    /// Requested end; `None` runs to the next replacement or the range end
    pub version_to: Option<Timestamp>,
}

impl<T> Replacement<T> {
    /// Replacement starting at `version_from` with no explicit end
    pub fn new(payload: T, version_from: Timestamp) -> Self {
        Replacement {
            payload,
            version_from,
            version_to: None,
        }
    }

    /// Set an explicit end
    pub fn until(mut self, version_to: Timestamp) -> Self {
        self.version_to = Some(version_to);
        self
    }

    /// Explicit end as a boundary (`Unbounded` when unset)
    pub fn version_to_boundary(&self) -> Boundary {
        Boundary::from(self.version_to)
    }
}

/// Check a replacement list before any state is read
///
/// - the list is non-empty and at most `max` long
/// - `version_from` is strictly increasing in caller order
/// - an explicit non-final `version_to` equals the next `version_from`
/// - an explicit final `version_to` is after the final `version_from`
pub fn validate_replacements<T>(replacements: &[Replacement<T>], max: usize) -> MasterResult<()> {
    if replacements.is_empty() {
        return Err(MasterError::invalid_input("replacement list is empty"));
    }
    if replacements.len() > max {
        return Err(MasterError::invalid_input(format!(
            "{} replacements exceeds the limit of {}",
            replacements.len(),
            max
        )));
    }

    for (index, pair) in replacements.windows(2).enumerate() {
        let (current, next) = (&pair[0], &pair[1]);
        if next.version_from <= current.version_from {
            return Err(MasterError::NonContiguousReplacements {
                index: index + 1,
                reason: format!(
                    "version_from {} is not after {}",
                    next.version_from, current.version_from
                ),
            });
        }
        if let Some(to) = current.version_to {
            if to != next.version_from {
                let kind = if to < next.version_from { "gap" } else { "overlap" };
                return Err(MasterError::NonContiguousReplacements {
                    index,
                    reason: format!(
                        "{}: version_to {} but next version_from {}",
                        kind, to, next.version_from
                    ),
                });
            }
        }
    }

    if let Some(last) = replacements.last() {
        if let Some(to) = last.version_to {
            if to <= last.version_from {
                return Err(MasterError::InvalidInterval {
                    from: last.version_from,
                    to: Boundary::At(to),
                });
            }
        }
    }
    Ok(())
}
