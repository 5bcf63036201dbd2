//! Point-in-time and history reads
//!
//! `QueryEngine` holds no state of its own. It resolves the "latest" parts
//! of a `VersionCorrection` (version against the clock, correction against
//! the active slice) and pages history results.

use masterdb_core::{
    Clock, DocumentStore, DocumentVersion, MasterError, MasterResult, ObjectId, TimeInterval,
    Timestamp, UniqueId, VersionCorrection,
};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;

/// History query for one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    object_id: ObjectId,
    versions: Option<TimeInterval>,
    corrections: Option<TimeInterval>,
    first_item: usize,
    page_size: Option<usize>,
}

impl HistoryRequest {
    /// Every record of `object_id`, first page
    pub fn new(object_id: ObjectId) -> Self {
        HistoryRequest {
            object_id,
            versions: None,
            corrections: None,
            first_item: 0,
            page_size: None,
        }
    }

    /// Only records whose version interval overlaps `window`
    pub fn versions(mut self, window: TimeInterval) -> Self {
        self.versions = Some(window);
        self
    }

    /// Only records whose correction window overlaps `window`
    pub fn corrections(mut self, window: TimeInterval) -> Self {
        self.corrections = Some(window);
        self
    }

    /// Only records still believed at or after `instant`
    pub fn corrections_from(self, instant: Timestamp) -> Self {
        self.corrections(TimeInterval::open(instant))
    }

    /// Select a page; `page_size` of `None` uses the configured default
    pub fn page(mut self, first_item: usize, page_size: Option<usize>) -> Self {
        self.first_item = first_item;
        self.page_size = page_size;
        self
    }

    /// Return every matching record in one page
    pub fn unpaged(self) -> Self {
        self.page(0, Some(usize::MAX))
    }

    /// Object queried
    pub fn object_id(&self) -> &ObjectId {
        &self.object_id
    }
}

/// Position of a page within a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    /// Index of the first item on this page
    pub first_item: usize,
    /// Requested page size
    pub page_size: usize,
    /// Items matching the query across all pages
    pub total_items: usize,
}

impl Paging {
    /// True if items exist after this page
    pub fn has_more(&self) -> bool {
        self.first_item.saturating_add(self.page_size) < self.total_items
    }
}

/// One page of history, newest view first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPage<T> {
    /// Where this page sits in the full result
    pub paging: Paging,
    /// Records on this page
    pub documents: Vec<DocumentVersion<T>>,
}

impl<T> HistoryPage<T> {
    /// Records on this page
    pub fn documents(&self) -> &[DocumentVersion<T>] {
        &self.documents
    }

    /// Number of records on this page
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True if the page holds no records
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Read-side facade over a `DocumentStore`
pub struct QueryEngine<T, S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    default_page_size: usize,
    _payload: PhantomData<fn() -> T>,
}

impl<T, S> Clone for QueryEngine<T, S> {
    fn clone(&self) -> Self {
        QueryEngine {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            default_page_size: self.default_page_size,
            _payload: PhantomData,
        }
    }
}

impl<T, S> std::fmt::Debug for QueryEngine<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryEngine")
            .field("clock", &self.clock)
            .field("default_page_size", &self.default_page_size)
            .finish()
    }
}

impl<T, S> QueryEngine<T, S>
where
    T: Clone + Send + Sync,
    S: DocumentStore<T>,
{
    /// Create a query engine reading from `store`
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, default_page_size: usize) -> Self {
        QueryEngine {
            store,
            clock,
            default_page_size,
            _payload: PhantomData,
        }
    }

    /// Same store, different clock
    pub fn with_clock(&self, clock: Arc<dyn Clock>) -> Self {
        QueryEngine {
            clock,
            ..self.clone()
        }
    }

    /// Replace "latest" version with the clock's now
    ///
    /// A "latest" correction is left in place and selects the active slice.
    pub fn resolve(&self, coordinate: VersionCorrection) -> VersionCorrection {
        VersionCorrection::of(
            Some(coordinate.version().unwrap_or_else(|| self.clock.now())),
            coordinate.correction(),
        )
    }

    /// Records of `object_id` at `correction` (`None` = active slice)
    pub fn slice_at(
        &self,
        object_id: &ObjectId,
        correction: Option<Timestamp>,
    ) -> MasterResult<Vec<DocumentVersion<T>>> {
        match correction {
            Some(instant) => self.store.load_slice_at(object_id, instant),
            None => self.store.load_active_slice(object_id),
        }
    }

    /// The record of `object_id` visible at `coordinate`
    pub fn get(
        &self,
        object_id: &ObjectId,
        coordinate: VersionCorrection,
    ) -> MasterResult<DocumentVersion<T>> {
        let resolved = self.resolve(coordinate);
        let version = resolved.version().unwrap_or_else(|| self.clock.now());
        self.store.load_at(object_id, version, resolved.correction())
    }

    /// One record by unique id, current or superseded
    pub fn get_by_unique_id(&self, unique_id: &UniqueId) -> MasterResult<DocumentVersion<T>> {
        self.store.load_record(unique_id)
    }

    /// One page of history, ordered version-from then correction-from, newest first
    pub fn history(&self, request: &HistoryRequest) -> MasterResult<HistoryPage<T>> {
        let page_size = request.page_size.unwrap_or(self.default_page_size);
        if page_size == 0 {
            return Err(MasterError::invalid_input("page size must be positive"));
        }
        let records = self.store.load_history(
            &request.object_id,
            request.versions.as_ref(),
            request.corrections.as_ref(),
        )?;
        let total_items = records.len();
        let documents = records
            .into_iter()
            .skip(request.first_item)
            .take(page_size)
            .collect();

        Ok(HistoryPage {
            paging: Paging {
                first_item: request.first_item,
                page_size,
                total_items,
            },
            documents,
        })
    }
}
