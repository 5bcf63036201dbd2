//! Document master facade
//!
//! `DocumentMaster<T>` is the entry point for business code. It bundles a
//! store, a clock, the write coordinator and the configuration, and exposes
//! every read and write operation on bitemporal documents.
//!
//! # Example
//!
//! ```ignore
//! use masterdb_engine::{DocumentMaster, MasterConfig};
//! use masterdb_core::{Timestamp, VersionCorrection};
//!
//! let master: DocumentMaster<String> = DocumentMaster::in_memory(MasterConfig::default())?;
//! let created = master.add("v1".to_string(), Timestamp::now(), None)?;
//! let latest = master.get(created.object_id(), VersionCorrection::LATEST)?;
//! ```
//!
//! # Clocks
//!
//! The master never reads global time directly. `with_clock` returns a view
//! over the same store and locks that stamps corrections and resolves
//! "latest" versions with another clock.

use masterdb_concurrency::{WriteCoordinator, WriteMetrics};
use masterdb_core::{
    Clock, DocumentStore, DocumentVersion, MasterResult, ObjectId, SystemClock, TimeInterval,
    Timestamp, UniqueId, VersionCorrection,
};
use masterdb_storage::ShardedDocumentStore;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::config::MasterConfig;
use crate::query::{HistoryPage, HistoryRequest, QueryEngine};
use crate::replacement::Replacement;
use crate::splice::SpliceEngine;

/// Bitemporal document master
pub struct DocumentMaster<T, S = ShardedDocumentStore<T>> {
    store: Arc<S>,
    config: MasterConfig,
    coordinator: Arc<WriteCoordinator>,
    splice: SpliceEngine<T, S>,
    query: QueryEngine<T, S>,
}

impl<T, S> Clone for DocumentMaster<T, S> {
    fn clone(&self) -> Self {
        DocumentMaster {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            coordinator: Arc::clone(&self.coordinator),
            splice: self.splice.clone(),
            query: self.query.clone(),
        }
    }
}

impl<T, S> std::fmt::Debug for DocumentMaster<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentMaster")
            .field("config", &self.config)
            .field("splice", &self.splice)
            .finish()
    }
}

impl<T> DocumentMaster<T, ShardedDocumentStore<T>>
where
    T: Clone + Send + Sync,
{
    /// In-memory master on the system clock
    pub fn in_memory(config: MasterConfig) -> MasterResult<Self> {
        Self::with_store(
            Arc::new(ShardedDocumentStore::new()),
            Arc::new(SystemClock),
            config,
        )
    }

    /// In-memory master configured from `path`
    ///
    /// A default config file is written first if none exists.
    pub fn from_config_file(path: &Path) -> MasterResult<Self> {
        MasterConfig::write_default_if_missing(path)?;
        let config = MasterConfig::from_file(path)?;
        Self::in_memory(config)
    }
}

impl<T, S> DocumentMaster<T, S>
where
    T: Clone + Send + Sync,
    S: DocumentStore<T>,
{
    /// Master over an existing store
    ///
    /// # Errors
    ///
    /// Returns `Config` if `config` does not validate.
    pub fn with_store(store: Arc<S>, clock: Arc<dyn Clock>, config: MasterConfig) -> MasterResult<Self> {
        config.validate()?;
        let coordinator = Arc::new(WriteCoordinator::new());
        let splice = SpliceEngine::new(
            Arc::clone(&store),
            Arc::clone(&coordinator),
            Arc::clone(&clock),
            config.max_replacements,
            config.verify_commits,
        );
        let query = QueryEngine::new(Arc::clone(&store), clock, config.history_page_size);
        info!(
            target: "masterdb::master",
            scheme = %config.scheme,
            objects = store.object_count(),
            "Document master ready"
        );
        Ok(DocumentMaster {
            store,
            config,
            coordinator,
            splice,
            query,
        })
    }

    /// A view over the same store and locks using `clock`
    pub fn with_clock(&self, clock: Arc<dyn Clock>) -> Self {
        DocumentMaster {
            splice: self.splice.with_clock(Arc::clone(&clock)),
            query: self.query.with_clock(clock),
            ..self.clone()
        }
    }

    /// The clock this view uses
    pub fn clock(&self) -> &Arc<dyn Clock> {
        self.splice.clock()
    }

    /// Active configuration
    pub fn config(&self) -> &MasterConfig {
        &self.config
    }

    /// Underlying store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Write statistics shared by every view of this master
    pub fn write_metrics(&self) -> WriteMetrics {
        self.coordinator.metrics()
    }

    // ========================================================================
    // Creation
    // ========================================================================

    /// Create a new lineage with a generated object id
    ///
    /// The record covers `[version_from, version_to)`; `None` is open-ended.
    pub fn add(
        &self,
        payload: T,
        version_from: Timestamp,
        version_to: Option<Timestamp>,
    ) -> MasterResult<DocumentVersion<T>> {
        let version = TimeInterval::new(version_from, version_to)?;
        let object_id = ObjectId::generate(self.config.scheme.clone());
        self.splice.add(&object_id, payload, version)
    }

    /// Create a new lineage under a caller-chosen object id
    ///
    /// Fails with `InvalidId` if the id would not survive a round trip
    /// through its text form, and with `InvalidInput` if `object_id`
    /// already has versions.
    pub fn add_with_id(
        &self,
        object_id: &ObjectId,
        payload: T,
        version: TimeInterval,
    ) -> MasterResult<DocumentVersion<T>> {
        object_id.validate()?;
        self.splice.add(object_id, payload, version)
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// The record of `object_id` visible at `coordinate`
    pub fn get(
        &self,
        object_id: &ObjectId,
        coordinate: VersionCorrection,
    ) -> MasterResult<DocumentVersion<T>> {
        self.query.get(object_id, coordinate)
    }

    /// One record by unique id, current or superseded
    pub fn get_by_unique_id(&self, unique_id: &UniqueId) -> MasterResult<DocumentVersion<T>> {
        self.query.get_by_unique_id(unique_id)
    }

    /// Records of `object_id` at `correction` (`None` = latest), by version
    pub fn slice_at(
        &self,
        object_id: &ObjectId,
        correction: Option<Timestamp>,
    ) -> MasterResult<Vec<DocumentVersion<T>>> {
        self.query.slice_at(object_id, correction)
    }

    /// One page of history
    pub fn history(&self, request: &HistoryRequest) -> MasterResult<HistoryPage<T>> {
        self.query.history(request)
    }

    // ========================================================================
    // Replacement
    // ========================================================================

    /// Replace the active records exactly covering `target`
    pub fn replace_versions(
        &self,
        object_id: &ObjectId,
        target: &TimeInterval,
        replacements: Vec<Replacement<T>>,
    ) -> MasterResult<Vec<DocumentVersion<T>>> {
        self.splice.replace_versions(object_id, target, replacements)
    }

    /// Replace one active record with replacements covering its interval
    pub fn replace_version(
        &self,
        unique_id: &UniqueId,
        replacements: Vec<Replacement<T>>,
    ) -> MasterResult<Vec<DocumentVersion<T>>> {
        self.splice.replace_version(unique_id, replacements)
    }

    /// Splice replacements over the span they cover
    pub fn splice(
        &self,
        object_id: &ObjectId,
        replacements: Vec<Replacement<T>>,
    ) -> MasterResult<Vec<DocumentVersion<T>>> {
        self.splice.splice(object_id, replacements)
    }

    // ========================================================================
    // Convenience edits
    // ========================================================================

    /// New version from `version_from` (default now) onwards
    pub fn update(
        &self,
        object_id: &ObjectId,
        payload: T,
        version_from: Option<Timestamp>,
    ) -> MasterResult<DocumentVersion<T>> {
        let from = version_from.unwrap_or_else(|| self.clock().now());
        self.splice.update(object_id, payload, from)
    }

    /// Replace one active record's payload, keeping its interval
    pub fn correct(&self, unique_id: &UniqueId, payload: T) -> MasterResult<DocumentVersion<T>> {
        self.splice.correct(unique_id, payload)
    }

    /// End the lineage at `at` (default now)
    pub fn remove(&self, object_id: &ObjectId, at: Option<Timestamp>) -> MasterResult<DocumentVersion<T>> {
        let at = at.unwrap_or_else(|| self.clock().now());
        self.splice.terminate(object_id, at)
    }
}
