//! Timeline invariants under random edit sequences
//!
//! Every edit either commits a batch that keeps each correction slice a
//! partition of version time, or fails with a caller error and leaves the
//! store unchanged. Slices already written never change afterwards.

#[path = "../common/mod.rs"]
mod common;

mod partition;
mod reproducibility;
