//! Write coordinator for serializing edits per object
//!
//! Every write to a timeline is a read-plan-commit sequence:
//!
//! ```text
//! 1. lock_for(object_id)        - serialize with other writers of the object
//! 2. load active slice          - read the state the plan is based on
//! 3. plan correction batch      - pure, may reject with a caller error
//! 4. commit_batch               - store re-validates and applies atomically
//! 5. unlock
//! ```
//!
//! The coordinator owns steps 1 and 5 plus metrics. Steps 2 to 4 are the
//! closure passed to `execute`.
//!
//! # Memory Ordering
//!
//! The metric counters use Relaxed ordering. They are observational only and
//! do not synchronize any other memory.

use masterdb_core::{MasterResult, ObjectId};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

use crate::locks::ObjectLocks;

/// Serializes writers per object and counts outcomes
#[derive(Debug, Default)]
pub struct WriteCoordinator {
    locks: ObjectLocks,
    /// Writes currently holding an object lock
    active_count: AtomicU64,
    total_started: AtomicU64,
    total_committed: AtomicU64,
    total_aborted: AtomicU64,
}

impl WriteCoordinator {
    /// Create a coordinator with an empty lock table
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `write` while holding the commit lock for `object_id`
    ///
    /// Any error returned by `write` counts as an abort and is passed through
    /// unchanged.
    pub fn execute<R, F>(&self, object_id: &ObjectId, operation: &str, write: F) -> MasterResult<R>
    where
        F: FnOnce() -> MasterResult<R>,
    {
        let lock = self.locks.lock_for(object_id);
        let _guard = lock.lock();

        self.total_started.fetch_add(1, Ordering::Relaxed);
        let mut in_flight = InFlight::start(self);
        let result = write();

        match &result {
            Ok(_) => {
                in_flight.committed = true;
                debug!(
                    target: "masterdb::concurrency",
                    object_id = %object_id,
                    operation,
                    "Write committed"
                );
            }
            Err(err) => {
                warn!(
                    target: "masterdb::concurrency",
                    object_id = %object_id,
                    operation,
                    error = %err,
                    retryable = err.is_retryable(),
                    "Write aborted"
                );
            }
        }
        drop(in_flight);
        result
    }

    /// Number of objects with a commit lock
    pub fn locked_objects(&self) -> usize {
        self.locks.len()
    }

    /// Snapshot of write statistics
    pub fn metrics(&self) -> WriteMetrics {
        let started = self.total_started.load(Ordering::Relaxed);
        let committed = self.total_committed.load(Ordering::Relaxed);

        WriteMetrics {
            active_count: self.active_count.load(Ordering::Relaxed),
            total_started: started,
            total_committed: committed,
            total_aborted: self.total_aborted.load(Ordering::Relaxed),
            commit_rate: if started > 0 {
                committed as f64 / started as f64
            } else {
                0.0
            },
        }
    }
}

/// One write holding an object lock
///
/// Settles the counters on drop, so a panicking write still leaves
/// `active_count` and counts as aborted.
struct InFlight<'a> {
    coordinator: &'a WriteCoordinator,
    committed: bool,
}

impl<'a> InFlight<'a> {
    fn start(coordinator: &'a WriteCoordinator) -> Self {
        coordinator.active_count.fetch_add(1, Ordering::Relaxed);
        InFlight {
            coordinator,
            committed: false,
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.coordinator.active_count.fetch_sub(1, Ordering::Relaxed);
        let outcome = if self.committed {
            &self.coordinator.total_committed
        } else {
            &self.coordinator.total_aborted
        };
        outcome.fetch_add(1, Ordering::Relaxed);
    }
}

/// Write statistics
#[derive(Debug, Clone, PartialEq)]
pub struct WriteMetrics {
    /// Writes currently in progress
    pub active_count: u64,
    /// Writes started
    pub total_started: u64,
    /// Writes that committed a batch
    pub total_committed: u64,
    /// Writes rejected or failed
    pub total_aborted: u64,
    /// Commit success rate (committed / started)
    pub commit_rate: f64,
}

impl WriteMetrics {
    /// Writes that finished (committed + aborted)
    pub fn total_completed(&self) -> u64 {
        self.total_committed + self.total_aborted
    }

    /// Abort rate (aborted / started)
    pub fn abort_rate(&self) -> f64 {
        if self.total_started > 0 {
            self.total_aborted as f64 / self.total_started as f64
        } else {
            0.0
        }
    }
}
