//! Concurrency layer for MasterDB
//!
//! Writers of one object are serialized; writers of different objects never
//! wait on each other:
//! - ObjectLocks: lazily created per-object commit locks
//! - WriteCoordinator: runs a read-plan-commit closure under the object's
//!   lock and keeps write metrics
//!
//! The store still re-checks every close against the active slice, so a
//! writer that bypasses the coordinator gets a `Conflict` instead of a
//! corrupted timeline.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod coordinator;
pub mod locks;

pub use coordinator::{WriteCoordinator, WriteMetrics};
pub use locks::ObjectLocks;
