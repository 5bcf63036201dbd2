//! Per-object commit locks
//!
//! Locks are created lazily on first write and live as long as the
//! `ObjectLocks` table. Terminated lineages can still be corrected, so
//! entries are never evicted.

use dashmap::DashMap;
use masterdb_core::ObjectId;
use parking_lot::Mutex;
use std::sync::Arc;

/// Table of commit locks keyed by ObjectId
#[derive(Debug, Default)]
pub struct ObjectLocks {
    locks: DashMap<ObjectId, Arc<Mutex<()>>>,
}

impl ObjectLocks {
    /// Create an empty lock table
    pub fn new() -> Self {
        Self::default()
    }

    /// The commit lock for `object_id`, created on first use
    ///
    /// The `Arc` is cloned out so the DashMap shard lock is released before
    /// the caller blocks on the mutex.
    pub fn lock_for(&self, object_id: &ObjectId) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.get(object_id) {
            return Arc::clone(lock.value());
        }
        Arc::clone(
            self.locks
                .entry(object_id.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .value(),
        )
    }

    /// Number of objects that have ever been written through this table
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// True before any object was locked
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
