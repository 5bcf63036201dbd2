//! Contract types for the bitemporal data model
//!
//! These types are what callers of a document master see. They express the
//! invariants every timeline must keep:
//!
//! 1. **Partition**: the active slice tiles version time with no gaps or overlaps
//! 2. **Correction monotonicity**: a record is superseded exactly when its successor starts
//! 3. **Well-formedness**: every interval has `from < to`
//! 4. **Append-only**: superseded records are retained, never rewritten
//!
//! ## Module Structure
//!
//! - `timestamp`: Microsecond instants (both axes)
//! - `interval`: Half-open intervals and their upper `Boundary`
//! - `version_correction`: Query coordinates
//! - `document`: The bitemporal record `DocumentVersion<T>`
//!
//! ## Usage
//!
//! ```
//! use masterdb_core::contract::{
//!     Boundary, DocumentVersion, TimeInterval, Timestamp, VersionCorrection
//! };
//! ```

pub mod document;
pub mod interval;
pub mod timestamp;
pub mod version_correction;

// Re-exports
pub use document::DocumentVersion;
pub use interval::{Boundary, TimeInterval};
pub use timestamp::Timestamp;
pub use version_correction::VersionCorrection;
