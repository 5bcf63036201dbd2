//! Shared test utilities for the root integration suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]

use std::sync::{Arc, Once};
use std::time::Duration;

use masterdb::{
    Clock, DocumentMaster, DocumentVersion, FixedClock, HistoryRequest, MasterConfig, ObjectId,
    ShardedDocumentStore, Timestamp,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Route tracing output through the test harness (shown with --nocapture).
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

// ============================================================================
// Time
// ============================================================================

/// Fixture "now": every scenario is laid out relative to this instant.
pub const T0: Timestamp = Timestamp::from_secs(1_700_000_000);

pub fn plus_secs(secs: u64) -> Timestamp {
    T0.saturating_add(Duration::from_secs(secs))
}

pub fn minus_secs(secs: u64) -> Timestamp {
    T0.saturating_sub(Duration::from_secs(secs))
}

pub fn plus_mins(mins: u64) -> Timestamp {
    plus_secs(mins * 60)
}

pub fn fixed_clock(instant: Timestamp) -> Arc<dyn Clock> {
    Arc::new(FixedClock::new(instant))
}

// ============================================================================
// Exchange payload
// ============================================================================

/// Exchange entity as stored by the exchange master.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub external_ids: Vec<String>,
    pub name: String,
    pub region: String,
}

pub fn exchange(name: &str) -> Exchange {
    Exchange {
        external_ids: vec!["B~B0".to_string()],
        name: name.to_string(),
        region: "R~R0".to_string(),
    }
}

pub fn names(records: &[DocumentVersion<Exchange>]) -> Vec<&str> {
    records.iter().map(|r| r.payload().name.as_str()).collect()
}

/// `(version_from, version_to)` of each record.
pub fn bounds(records: &[DocumentVersion<Exchange>]) -> Vec<(Timestamp, Option<Timestamp>)> {
    records
        .iter()
        .map(|r| (r.version_from(), r.version_to()))
        .collect()
}

// ============================================================================
// Exchange master fixture
// ============================================================================

pub fn exchange_master(clock: Arc<dyn Clock>) -> DocumentMaster<Exchange> {
    init_tracing();
    DocumentMaster::with_store(
        Arc::new(ShardedDocumentStore::new()),
        clock,
        MasterConfig::with_scheme("DbExg"),
    )
    .expect("default exchange config is valid")
}

/// Exchange lineage used by the replace scenarios.
pub struct ExchangeFixture {
    /// View with the clock two hours after setup
    pub master: DocumentMaster<Exchange>,
    pub object_id: ObjectId,
}

/// Five versions `[T0, +1m) [+1m, +2m) [+2m, +3m) [+3m, +4m) [+4m, ∞)`
/// written at `T0`, then a correction of the first one.
///
/// ```text
///   +4m |------------------------ setup_4 ---------->>>
///   +3m |------------------------ setup_3
///   +2m |------------------------ setup_2
///   +1m |------------------------ setup_1
///    T0 |------------------------ setup_0 (corrected)
/// ```
pub fn setup_test_data() -> ExchangeFixture {
    let setup = exchange_master(fixed_clock(T0));
    let first = setup.add(exchange("setup_0"), T0, None).unwrap();
    let object_id = first.object_id().clone();
    for i in 1..=4 {
        setup
            .update(&object_id, exchange(&format!("setup_{}", i)), Some(plus_mins(i)))
            .unwrap();
    }
    let first_active = setup
        .get(&object_id, masterdb::VersionCorrection::of_version(T0))
        .unwrap();
    setup
        .correct(first_active.unique_id(), exchange("setup_0 corrected"))
        .unwrap();

    ExchangeFixture {
        master: setup.with_clock(fixed_clock(plus_mins(120))),
        object_id,
    }
}

/// History restricted to corrections at or after `T0 + 2h`, newest first.
pub fn history_since_correction(fixture: &ExchangeFixture) -> Vec<DocumentVersion<Exchange>> {
    fixture
        .master
        .history(
            &HistoryRequest::new(fixture.object_id.clone())
                .corrections_from(plus_mins(120))
                .unpaged(),
        )
        .unwrap()
        .documents
}

/// Every record ever written, newest first.
pub fn full_history(fixture: &ExchangeFixture) -> Vec<DocumentVersion<Exchange>> {
    fixture
        .master
        .history(&HistoryRequest::new(fixture.object_id.clone()).unpaged())
        .unwrap()
        .documents
}
