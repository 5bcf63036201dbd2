//! Document engine for MasterDB
//!
//! This crate puts the lower layers together:
//! - SpliceEngine: plans and commits every write as one correction batch
//! - QueryEngine: resolves VersionCorrection coordinates and pages history
//! - DocumentMaster: facade bundling store, clock, write locks and config
//! - MasterConfig: `masterdb.toml` configuration
//!
//! The engine is the only component that knows about:
//! - Replacement validation and re-anchoring
//! - Correction-instant stamping against the injected clock
//! - Serializing writers per object

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod master;
pub mod query;
pub mod replacement;
pub mod splice;

pub use config::{MasterConfig, CONFIG_FILE_NAME};
pub use master::DocumentMaster;
pub use query::{HistoryPage, HistoryRequest, Paging, QueryEngine};
pub use replacement::{validate_replacements, Replacement};
pub use splice::{
    check_plan, plan_exact_replace, plan_single_replace, plan_splice, plan_terminate,
    SpliceEngine, SplicePlan,
};
