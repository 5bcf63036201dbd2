//! Exchange master scenarios
//!
//! Replays the exchange-master replacement cases against a lineage of five
//! versions one minute apart, then checks the resulting slices and history.

#[path = "../common/mod.rs"]
mod common;

mod history;
mod replace_versions;
mod splice;
