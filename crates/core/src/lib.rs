//! Core types and traits for MasterDB
//!
//! This crate defines the foundational types used throughout the system:
//! - Timestamp, Boundary, TimeInterval: positions and extents on a time axis
//! - ObjectId, UniqueId: lineage and record identity
//! - VersionCorrection: bitemporal query coordinate
//! - DocumentVersion: one bitemporal record
//! - CorrectionBatch: unit of atomic commit
//! - Clock: injected source of "now"
//! - DocumentStore: persistence boundary
//! - MasterError: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod clock;
pub mod contract;
pub mod error;
pub mod traits;
pub mod types;

pub use batch::{CorrectionBatch, PendingVersion};
pub use clock::{Clock, FixedClock, SystemClock};
pub use contract::{Boundary, DocumentVersion, TimeInterval, Timestamp, VersionCorrection};
pub use error::{MasterError, MasterResult};
pub use traits::DocumentStore;
pub use types::{ObjectId, UniqueId, ID_SEPARATOR};
