//! MasterDB - Bitemporal document master
//!
//! MasterDB records the full history of mutable business entities along two
//! time axes: when a fact was true (version time) and when the system
//! believed it (correction time).
//!
//! # Quick Start
//!
//! ```ignore
//! use masterdb::{DocumentMaster, MasterConfig, Replacement, Timestamp, VersionCorrection};
//!
//! let master: DocumentMaster<String> = DocumentMaster::in_memory(MasterConfig::default())?;
//!
//! // First version of a new lineage
//! let created = master.add("NYSE".into(), Timestamp::now(), None)?;
//! let oid = created.object_id().clone();
//!
//! // Split it into two versions in one correction
//! master.replace_version(created.unique_id(), vec![
//!     Replacement::new("NYSE".into(), created.version_from()),
//!     Replacement::new("NYSE Euronext".into(), Timestamp::now()),
//! ])?;
//!
//! let latest = master.get(&oid, VersionCorrection::LATEST)?;
//! ```
//!
//! # Architecture
//!
//! - `masterdb-core`: value types, errors, the `DocumentStore` boundary
//! - `masterdb-storage`: per-object timelines in a sharded in-memory store
//! - `masterdb-concurrency`: per-object write serialization
//! - `masterdb-engine`: splice planning, queries and the facade

pub use masterdb_concurrency::WriteMetrics;
pub use masterdb_core::*;
pub use masterdb_engine::{
    DocumentMaster, HistoryPage, HistoryRequest, MasterConfig, Paging, Replacement,
    CONFIG_FILE_NAME,
};
pub use masterdb_storage::ShardedDocumentStore;
