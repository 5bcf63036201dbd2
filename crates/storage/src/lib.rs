//! Storage layer for MasterDB
//!
//! This crate implements the in-memory timeline store:
//! - Timeline: every record of one lineage, with slice validation
//! - ShardedDocumentStore: DashMap of timelines implementing `DocumentStore`
//!
//! # Concurrency
//!
//! - Readers of one object never block writers of another
//! - A correction batch is applied under one shard lock, all or nothing
//! - Every slice read is re-checked against the partition invariant

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod sharded;
pub mod timeline;

pub use sharded::ShardedDocumentStore;
pub use timeline::{check_partition, Timeline};
