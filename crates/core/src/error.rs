//! Error types for the document master
//!
//! Every operation returns a typed `MasterError`; no failure is reported as a
//! side effect. We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! Validation always happens before any state is touched, so every variant
//! except `CorruptTimeline` describes a rejected request that left the timeline
//! unchanged.

use crate::contract::{Boundary, Timestamp};
use crate::types::{ObjectId, UniqueId};
use thiserror::Error;

/// Result type alias for master operations
pub type MasterResult<T> = std::result::Result<T, MasterError>;

/// Error types for the document master
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MasterError {
    /// Malformed `[from, to)` interval supplied by the caller
    #[error("Invalid interval: [{from}, {to})")]
    InvalidInterval {
        /// Lower bound supplied
        from: Timestamp,
        /// Upper bound supplied
        to: Boundary,
    },

    /// Target range does not align to existing partition boundaries
    #[error("Non-exact range for {object_id}: {reason}")]
    NonExactRange {
        /// Object whose timeline was targeted
        object_id: ObjectId,
        /// What did not line up
        reason: String,
    },

    /// Attempt to replace a record that is no longer the active correction
    #[error("Stale version {unique_id}: superseded at {superseded_at}")]
    StaleVersion {
        /// Record the caller tried to replace
        unique_id: UniqueId,
        /// Correction instant at which it was superseded
        superseded_at: Timestamp,
    },

    /// Replacement boundaries disagree with the replaced record's interval
    #[error("Boundary mismatch: expected {expected}, got {actual}")]
    BoundaryMismatch {
        /// Boundary of the record being replaced
        expected: Boundary,
        /// Boundary supplied by the replacements
        actual: Boundary,
    },

    /// Replacement list has a gap, an overlap, or is out of order
    #[error("Replacements not contiguous at index {index}: {reason}")]
    NonContiguousReplacements {
        /// Index of the offending replacement (caller order)
        index: usize,
        /// Description of the defect
        reason: String,
    },

    /// Query coordinate or identifier resolves to no record
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invariant violation detected on read or commit
    ///
    /// Fatal for the object's timeline; never repaired silently.
    #[error("Corrupt timeline for {object_id}: {reason}")]
    CorruptTimeline {
        /// Object whose timeline is corrupt
        object_id: ObjectId,
        /// Which invariant failed
        reason: String,
    },

    /// Store rejected a batch because its view of the timeline is outdated
    #[error("Commit conflict for {object_id}: {reason}")]
    Conflict {
        /// Object the batch was written to
        object_id: ObjectId,
        /// Why the batch could not be applied
        reason: String,
    },

    /// Identifier text could not be parsed
    #[error("Invalid identifier: '{0}'")]
    InvalidId(String),

    /// Request is structurally invalid (empty replacement list, etc.)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be read or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MasterError {
    /// Create a `NotFound` error
    pub fn not_found(what: impl Into<String>) -> Self {
        MasterError::NotFound(what.into())
    }

    /// Create an `InvalidInput` error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        MasterError::InvalidInput(message.into())
    }

    /// Create a `NonExactRange` error
    pub fn non_exact_range(object_id: &ObjectId, reason: impl Into<String>) -> Self {
        MasterError::NonExactRange {
            object_id: object_id.clone(),
            reason: reason.into(),
        }
    }

    /// Create a `CorruptTimeline` error
    pub fn corrupt(object_id: &ObjectId, reason: impl Into<String>) -> Self {
        MasterError::CorruptTimeline {
            object_id: object_id.clone(),
            reason: reason.into(),
        }
    }

    /// Create a `Conflict` error
    pub fn conflict(object_id: &ObjectId, reason: impl Into<String>) -> Self {
        MasterError::Conflict {
            object_id: object_id.clone(),
            reason: reason.into(),
        }
    }

    /// Create a `Config` error
    pub fn config(message: impl Into<String>) -> Self {
        MasterError::Config(message.into())
    }

    /// True for errors caused by a bad request rather than a system defect
    pub fn is_caller_error(&self) -> bool {
        !matches!(
            self,
            MasterError::CorruptTimeline { .. } | MasterError::Conflict { .. } | MasterError::Config(_)
        )
    }

    /// True only for invariant violations that must be escalated
    pub fn is_fatal(&self) -> bool {
        matches!(self, MasterError::CorruptTimeline { .. })
    }

    /// True when retrying the same request may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, MasterError::Conflict { .. })
    }
}
