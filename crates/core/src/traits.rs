//! Persistence boundary for document timelines
//!
//! `DocumentStore` is the only thing the engine needs from persistence: read
//! an object's records with a correction filter, and commit one correction
//! batch atomically. This lets the in-memory store be replaced by a
//! transactional backend without touching the splice logic.
//!
//! Thread safety: all methods must be safe to call concurrently from multiple
//! threads (requires Send + Sync).

use crate::batch::CorrectionBatch;
use crate::contract::{DocumentVersion, TimeInterval, Timestamp};
use crate::error::MasterResult;
use crate::types::{ObjectId, UniqueId};

/// Storage abstraction for bitemporal timelines
pub trait DocumentStore<T>: Send + Sync {
    /// Records of `object_id` whose correction window is still open
    ///
    /// Ordered by `version_from` ascending and checked against the partition
    /// invariant.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown object, `CorruptTimeline` if the slice is
    /// not a partition.
    fn load_active_slice(&self, object_id: &ObjectId) -> MasterResult<Vec<DocumentVersion<T>>>;

    /// Records of `object_id` visible at correction instant `correction`
    ///
    /// Same ordering and checks as `load_active_slice`.
    fn load_slice_at(
        &self,
        object_id: &ObjectId,
        correction: Timestamp,
    ) -> MasterResult<Vec<DocumentVersion<T>>>;

    /// The record of `object_id` covering `version` at `correction`
    ///
    /// `None` for `correction` reads the active slice.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown object or when no record covers `version`.
    fn load_at(
        &self,
        object_id: &ObjectId,
        version: Timestamp,
        correction: Option<Timestamp>,
    ) -> MasterResult<DocumentVersion<T>>;

    /// One record by unique id, current or superseded
    fn load_record(&self, unique_id: &UniqueId) -> MasterResult<DocumentVersion<T>>;

    /// Records overlapping both windows (`None` = unrestricted)
    ///
    /// Ordered version-from descending, then correction-from descending.
    fn load_history(
        &self,
        object_id: &ObjectId,
        versions: Option<&TimeInterval>,
        corrections: Option<&TimeInterval>,
    ) -> MasterResult<Vec<DocumentVersion<T>>>;

    /// Newest correction instant recorded for `object_id`, if any
    fn latest_correction(&self, object_id: &ObjectId) -> Option<Timestamp>;

    /// Correction stamp for the next batch of `object_id` given clock `now`
    ///
    /// Strictly after `latest_correction`; `now` itself when that allows.
    fn next_correction(&self, object_id: &ObjectId, now: Timestamp) -> Timestamp;

    /// Apply a batch atomically, returning the inserted records
    ///
    /// A batch without closes creates the object's timeline. Any close that
    /// targets a record which is not currently active fails the whole batch
    /// with `Conflict`; a batch that would break the partition invariant fails
    /// with `CorruptTimeline`. On error nothing is applied.
    fn commit_batch(&self, batch: CorrectionBatch<T>) -> MasterResult<Vec<DocumentVersion<T>>>;

    /// True if any record exists for `object_id`
    fn contains(&self, object_id: &ObjectId) -> bool;

    /// Number of objects with at least one record
    fn object_count(&self) -> usize;
}
