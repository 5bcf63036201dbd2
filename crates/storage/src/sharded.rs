//! Sharded in-memory document store
//!
//! # Design
//!
//! - DashMap: sharded by ObjectId, readers of one object never block
//!   writers of another
//! - FxHash: fast non-crypto hash for the object map
//! - Per-object `Timeline`: all records of a lineage live together, so a
//!   batch is applied under a single shard lock
//!
//! # Atomicity
//!
//! `commit_batch` holds the object's shard write lock while the timeline
//! builds, validates and swaps in its new state. Readers take the shard read
//! lock, so they see either the whole batch or none of it.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use masterdb_core::{
    CorrectionBatch, DocumentStore, DocumentVersion, MasterError, MasterResult, ObjectId,
    TimeInterval, Timestamp, UniqueId,
};
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::timeline::Timeline;

type FxBuildHasher = BuildHasherDefault<FxHasher>;

/// In-memory `DocumentStore` keyed by ObjectId
///
/// # Example
///
/// ```ignore
/// use masterdb_storage::ShardedDocumentStore;
/// use std::sync::Arc;
///
/// let store: Arc<ShardedDocumentStore<String>> = Arc::new(ShardedDocumentStore::new());
/// ```
pub struct ShardedDocumentStore<T> {
    timelines: DashMap<ObjectId, Timeline<T>, FxBuildHasher>,
    /// Batches successfully applied
    commits: AtomicU64,
}

impl<T> ShardedDocumentStore<T> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            timelines: DashMap::with_hasher(FxBuildHasher::default()),
            commits: AtomicU64::new(0),
        }
    }

    /// Create with room for `num_objects` lineages
    pub fn with_capacity(num_objects: usize) -> Self {
        Self {
            timelines: DashMap::with_capacity_and_hasher(num_objects, FxBuildHasher::default()),
            commits: AtomicU64::new(0),
        }
    }

    /// Number of batches applied since creation
    #[inline]
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::Acquire)
    }

    /// Records across all objects, superseded ones included
    pub fn record_count(&self) -> usize {
        self.timelines.iter().map(|entry| entry.value().len()).sum()
    }

    /// Check every object's slices at every correction instant
    pub fn verify_all(&self) -> MasterResult<()> {
        for entry in self.timelines.iter() {
            entry.value().verify()?;
        }
        Ok(())
    }

    /// Run `f` against one timeline under its shard read lock
    fn with_timeline<R>(
        &self,
        object_id: &ObjectId,
        f: impl FnOnce(&Timeline<T>) -> MasterResult<R>,
    ) -> MasterResult<R> {
        let timeline = self
            .timelines
            .get(object_id)
            .ok_or_else(|| MasterError::not_found(object_id.to_string()))?;
        let result = f(timeline.value());
        if let Err(err @ MasterError::CorruptTimeline { .. }) = &result {
            tracing::error!(
                target: "masterdb::storage",
                object_id = %object_id,
                error = %err,
                "Timeline failed partition check on read"
            );
        }
        result
    }
}

impl<T> Default for ShardedDocumentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ShardedDocumentStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShardedDocumentStore")
            .field("objects", &self.timelines.len())
            .field("commits", &self.commit_count())
            .finish()
    }
}

impl<T: Clone + Send + Sync> DocumentStore<T> for ShardedDocumentStore<T> {
    fn load_active_slice(&self, object_id: &ObjectId) -> MasterResult<Vec<DocumentVersion<T>>> {
        self.with_timeline(object_id, |timeline| {
            Ok(timeline.active_slice()?.into_iter().cloned().collect())
        })
    }

    fn load_slice_at(
        &self,
        object_id: &ObjectId,
        correction: Timestamp,
    ) -> MasterResult<Vec<DocumentVersion<T>>> {
        self.with_timeline(object_id, |timeline| {
            Ok(timeline
                .current_slice(correction)?
                .into_iter()
                .cloned()
                .collect())
        })
    }

    fn load_at(
        &self,
        object_id: &ObjectId,
        version: Timestamp,
        correction: Option<Timestamp>,
    ) -> MasterResult<DocumentVersion<T>> {
        self.with_timeline(object_id, |timeline| {
            timeline.get(version, correction).cloned()
        })
    }

    fn load_record(&self, unique_id: &UniqueId) -> MasterResult<DocumentVersion<T>> {
        self.with_timeline(unique_id.object_id(), |timeline| {
            timeline.record(unique_id).cloned()
        })
        .map_err(|err| match err {
            MasterError::NotFound(_) => MasterError::not_found(unique_id.to_string()),
            other => other,
        })
    }

    fn load_history(
        &self,
        object_id: &ObjectId,
        versions: Option<&TimeInterval>,
        corrections: Option<&TimeInterval>,
    ) -> MasterResult<Vec<DocumentVersion<T>>> {
        self.with_timeline(object_id, |timeline| {
            Ok(timeline
                .history(versions, corrections)
                .into_iter()
                .cloned()
                .collect())
        })
    }

    fn latest_correction(&self, object_id: &ObjectId) -> Option<Timestamp> {
        self.timelines
            .get(object_id)
            .and_then(|timeline| timeline.latest_correction())
    }

    fn next_correction(&self, object_id: &ObjectId, now: Timestamp) -> Timestamp {
        self.timelines
            .get(object_id)
            .map_or(now, |timeline| timeline.next_correction_instant(now))
    }

    fn commit_batch(&self, batch: CorrectionBatch<T>) -> MasterResult<Vec<DocumentVersion<T>>> {
        let object_id = batch.object_id().clone();
        let correction = batch.correction();
        let closed = batch.closes().len();

        let result = match self.timelines.entry(object_id.clone()) {
            Entry::Occupied(mut entry) => entry.get_mut().apply(batch),
            Entry::Vacant(entry) => {
                if batch.is_creation() {
                    let mut timeline = Timeline::new(object_id.clone());
                    timeline.apply(batch).map(|inserted| {
                        entry.insert(timeline);
                        inserted
                    })
                } else {
                    Err(MasterError::conflict(&object_id, "object does not exist"))
                }
            }
        };

        match &result {
            Ok(inserted) => {
                self.commits.fetch_add(1, Ordering::AcqRel);
                tracing::debug!(
                    target: "masterdb::storage",
                    object_id = %object_id,
                    correction = %correction,
                    closed,
                    inserted = inserted.len(),
                    "Committed correction batch"
                );
            }
            Err(err) if err.is_fatal() => {
                tracing::error!(
                    target: "masterdb::storage",
                    object_id = %object_id,
                    correction = %correction,
                    error = %err,
                    "Batch would corrupt timeline, rejected"
                );
            }
            Err(err) => {
                tracing::warn!(
                    target: "masterdb::storage",
                    object_id = %object_id,
                    correction = %correction,
                    error = %err,
                    "Correction batch rejected"
                );
            }
        }
        result
    }

    fn contains(&self, object_id: &ObjectId) -> bool {
        self.timelines.contains_key(object_id)
    }

    fn object_count(&self) -> usize {
        self.timelines.len()
    }
}
