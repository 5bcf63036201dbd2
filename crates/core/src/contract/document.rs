//! One bitemporal record
//!
//! A `DocumentVersion<T>` positions a payload on both time axes:
//!
//! ```text
//! version:     [version_from, version_to)        when the fact was true
//! correction:  [correction_from, correction_to)  when the system believed it
//! ```
//!
//! ## Lifecycle
//!
//! - Born when a document is added or a correction batch inserts it
//! - Closed when a later batch sets `correction_to`
//! - Never destroyed; closed records are retained for history
//!
//! Callers always receive owned copies. The only way to change a stored
//! record is a correction batch committed through the store.

use super::{Boundary, TimeInterval, Timestamp};
use crate::error::MasterResult;
use crate::types::{ObjectId, UniqueId};
use serde::{Deserialize, Serialize};

/// A payload with its version-time and correction-time extent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentVersion<T> {
    unique_id: UniqueId,
    version: TimeInterval,
    correction: TimeInterval,
    payload: T,
}

impl<T> DocumentVersion<T> {
    /// Assemble a record from already-validated parts
    pub fn new(
        unique_id: UniqueId,
        version: TimeInterval,
        correction: TimeInterval,
        payload: T,
    ) -> Self {
        DocumentVersion {
            unique_id,
            version,
            correction,
            payload,
        }
    }

    /// Identity of this record
    #[inline]
    pub fn unique_id(&self) -> &UniqueId {
        &self.unique_id
    }

    /// Identity of the lineage
    #[inline]
    pub fn object_id(&self) -> &ObjectId {
        self.unique_id.object_id()
    }

    /// Version-time extent
    #[inline]
    pub fn version(&self) -> &TimeInterval {
        &self.version
    }

    /// Correction-time extent
    #[inline]
    pub fn correction(&self) -> &TimeInterval {
        &self.correction
    }

    /// Start of version-time validity
    #[inline]
    pub fn version_from(&self) -> Timestamp {
        self.version.from()
    }

    /// End of version-time validity, `None` when open-ended
    #[inline]
    pub fn version_to(&self) -> Option<Timestamp> {
        self.version.to_instant()
    }

    /// When this belief was recorded
    #[inline]
    pub fn correction_from(&self) -> Timestamp {
        self.correction.from()
    }

    /// When this belief was superseded, `None` while current
    #[inline]
    pub fn correction_to(&self) -> Option<Timestamp> {
        self.correction.to_instant()
    }

    /// True while no later correction has superseded this record
    #[inline]
    pub fn is_current(&self) -> bool {
        self.correction.is_open_ended()
    }

    /// True when the record is visible at `version` as believed at `correction`
    pub fn is_visible_at(&self, version: Timestamp, correction: Timestamp) -> bool {
        self.version.contains(version) && self.correction.contains(correction)
    }

    /// The payload
    #[inline]
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Consume and return the payload
    pub fn into_payload(self) -> T {
        self.payload
    }

    /// Map the payload to a new type, keeping identity and intervals
    pub fn map<U, F>(self, f: F) -> DocumentVersion<U>
    where
        F: FnOnce(T) -> U,
    {
        DocumentVersion {
            unique_id: self.unique_id,
            version: self.version,
            correction: self.correction,
            payload: f(self.payload),
        }
    }

    /// Close the correction window at `instant`
    ///
    /// Fails with `InvalidInterval` if `instant` is not after `correction_from`.
    pub fn close(&mut self, instant: Timestamp) -> MasterResult<()> {
        self.correction = self.correction.with_to(Boundary::At(instant))?;
        Ok(())
    }
}
