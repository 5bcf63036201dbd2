//! Correction batches
//!
//! A `CorrectionBatch` is the unit of atomic commit: it closes some active
//! records and inserts new ones, all stamped with one correction instant.
//! In history, one batch shows up as one correction event.
//!
//! ```text
//! closes:  [uid_3, uid_4]         correction_to := instant
//! inserts: [[v0, v1), [v1, ∞)]    correction    := [instant, ∞)
//! ```

use crate::contract::{TimeInterval, Timestamp};
use crate::error::{MasterError, MasterResult};
use crate::types::{ObjectId, UniqueId};

/// A record waiting for its unique id
#[derive(Debug, Clone, PartialEq)]
pub struct PendingVersion<T> {
    /// Version-time extent of the new record
    pub version: TimeInterval,
    /// Entity snapshot
    pub payload: T,
}

/// Closes and inserts committed together at one correction instant
#[derive(Debug, Clone)]
pub struct CorrectionBatch<T> {
    object_id: ObjectId,
    correction: Timestamp,
    closes: Vec<UniqueId>,
    inserts: Vec<PendingVersion<T>>,
}

impl<T> CorrectionBatch<T> {
    /// Start an empty batch for `object_id` stamped at `correction`
    pub fn new(object_id: ObjectId, correction: Timestamp) -> Self {
        CorrectionBatch {
            object_id,
            correction,
            closes: Vec::new(),
            inserts: Vec::new(),
        }
    }

    /// Supersede the active record `unique_id`
    ///
    /// The record must belong to this batch's object.
    pub fn close(&mut self, unique_id: UniqueId) -> MasterResult<()> {
        if unique_id.object_id() != &self.object_id {
            return Err(MasterError::invalid_input(format!(
                "cannot close {} in a batch for {}",
                unique_id, self.object_id
            )));
        }
        if !self.closes.contains(&unique_id) {
            self.closes.push(unique_id);
        }
        Ok(())
    }

    /// Add a new record covering `version`
    pub fn insert(&mut self, version: TimeInterval, payload: T) {
        self.inserts.push(PendingVersion { version, payload });
    }

    /// Object the batch applies to
    pub fn object_id(&self) -> &ObjectId {
        &self.object_id
    }

    /// Correction instant shared by every close and insert
    pub fn correction(&self) -> Timestamp {
        self.correction
    }

    /// Records to supersede
    pub fn closes(&self) -> &[UniqueId] {
        &self.closes
    }

    /// Records to create
    pub fn inserts(&self) -> &[PendingVersion<T>] {
        &self.inserts
    }

    /// True for a batch that only creates records
    pub fn is_creation(&self) -> bool {
        self.closes.is_empty()
    }

    /// True when the batch would change nothing
    pub fn is_empty(&self) -> bool {
        self.closes.is_empty() && self.inserts.is_empty()
    }

    /// Split into `(object_id, correction, closes, inserts)`
    pub fn into_parts(self) -> (ObjectId, Timestamp, Vec<UniqueId>, Vec<PendingVersion<T>>) {
        (self.object_id, self.correction, self.closes, self.inserts)
    }
}
