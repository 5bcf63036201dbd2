//! Splice planning and execution
//!
//! Every write is planned against the active slice before anything is
//! touched. A plan lists the records to close and the records to insert;
//! `check_plan` simulates the resulting slice, and only a plan that still
//! tiles version time is turned into a `CorrectionBatch`.
//!
//! ```text
//! active:   [v0 ──── v1)[v1 ──────────── v2)[v2 ─────────────── ∞)
//! splice:                     [r0 ── r1)[r1 ──── r2)
//! result:   [v0 ──── v1)[v1 ─ r0)[r0 ── r1)[r1 ──── r2)[r2 ──── ∞)
//!                        remnant                        remnant
//! ```
//!
//! Three call shapes share the planner:
//! - `replace_versions`: target range must match existing boundaries;
//!   replacements are re-anchored onto it
//! - `replace_version`: one active record, boundaries must match exactly
//! - `splice`: range taken from the replacements; partly covered records
//!   keep their outside parts as remnants

use masterdb_concurrency::WriteCoordinator;
use masterdb_core::{
    Boundary, Clock, CorrectionBatch, DocumentStore, DocumentVersion, MasterError, MasterResult,
    ObjectId, PendingVersion, TimeInterval, Timestamp, UniqueId,
};
use masterdb_storage::check_partition;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, error};

use crate::replacement::{validate_replacements, Replacement};

/// Closes and inserts computed for one write, before stamping
#[derive(Debug, Clone, PartialEq)]
pub struct SplicePlan<T> {
    /// Active records to supersede
    pub closes: Vec<UniqueId>,
    /// New records, in insertion order
    pub inserts: Vec<PendingVersion<T>>,
}

impl<T> SplicePlan<T> {
    /// Stamp the plan with a correction instant
    pub fn into_batch(
        self,
        object_id: ObjectId,
        correction: Timestamp,
    ) -> MasterResult<CorrectionBatch<T>> {
        let mut batch = CorrectionBatch::new(object_id, correction);
        for unique_id in self.closes {
            batch.close(unique_id)?;
        }
        for pending in self.inserts {
            batch.insert(pending.version, pending.payload);
        }
        Ok(batch)
    }
}

/// Lay replacements end to end from `first_from` to `last_to`
///
/// Each replacement runs to the next one's `version_from`. The first start
/// and the last end are forced to the given anchors.
fn shape<T>(
    replacements: Vec<Replacement<T>>,
    first_from: Timestamp,
    last_to: Boundary,
) -> MasterResult<Vec<PendingVersion<T>>> {
    let mut froms: Vec<Timestamp> = replacements.iter().map(|r| r.version_from).collect();
    if let Some(first) = froms.first_mut() {
        *first = first_from;
    }
    let count = replacements.len();
    replacements
        .into_iter()
        .enumerate()
        .map(|(i, replacement)| {
            let to = if i + 1 < count {
                Boundary::At(froms[i + 1])
            } else {
                last_to
            };
            Ok(PendingVersion {
                version: TimeInterval::new(froms[i], to)?,
                payload: replacement.payload,
            })
        })
        .collect()
}

/// Plan an exact range replace
///
/// `target` must start at one active record's `version_from` and end at a
/// later (or the same) record's `version_to`. An explicit final `version_to`
/// on the replacements is ignored in favour of `target`'s end.
pub fn plan_exact_replace<T>(
    object_id: &ObjectId,
    active: &[DocumentVersion<T>],
    target: &TimeInterval,
    replacements: Vec<Replacement<T>>,
) -> MasterResult<SplicePlan<T>> {
    let start = active
        .iter()
        .position(|r| r.version_from() == target.from())
        .ok_or_else(|| {
            MasterError::non_exact_range(
                object_id,
                format!("target start {} is not a version boundary", target.from()),
            )
        })?;

    let mut closes = Vec::new();
    let mut matched = false;
    for record in &active[start..] {
        if record.version().to() > target.to() {
            break;
        }
        closes.push(record.unique_id().clone());
        if record.version().to() == target.to() {
            matched = true;
            break;
        }
    }
    if !matched {
        return Err(MasterError::non_exact_range(
            object_id,
            format!("target end {} is not a version boundary", target.to()),
        ));
    }

    if let Some(last) = replacements.last() {
        if let Some(to) = last.version_to {
            if Boundary::At(to) != target.to() {
                debug!(
                    target: "masterdb::splice",
                    object_id = %object_id,
                    requested = %to,
                    anchored = %target.to(),
                    "Re-anchoring final replacement to target end"
                );
            }
        }
    }

    Ok(SplicePlan {
        closes,
        inserts: shape(replacements, target.from(), target.to())?,
    })
}

/// Plan a single-record replace
///
/// `record` must be active. The replacements must start exactly at its
/// `version_from`, stay inside its interval and, if an explicit final end is
/// given, end exactly at its `version_to`.
pub fn plan_single_replace<T>(
    record: &DocumentVersion<T>,
    replacements: Vec<Replacement<T>>,
) -> MasterResult<SplicePlan<T>> {
    if let Some(superseded_at) = record.correction_to() {
        return Err(MasterError::StaleVersion {
            unique_id: record.unique_id().clone(),
            superseded_at,
        });
    }
    let record_from = record.version_from();
    let record_to = record.version().to();

    match replacements.first() {
        Some(first) if first.version_from == record_from => {}
        Some(first) => {
            return Err(MasterError::non_exact_range(
                record.object_id(),
                format!(
                    "first replacement starts at {} but {} starts at {}",
                    first.version_from,
                    record.unique_id(),
                    record_from
                ),
            ))
        }
        None => return Err(MasterError::invalid_input("replacement list is empty")),
    }
    if let Some(outside) = replacements
        .iter()
        .find(|r| Boundary::At(r.version_from) >= record_to)
    {
        return Err(MasterError::BoundaryMismatch {
            expected: record_to,
            actual: Boundary::At(outside.version_from),
        });
    }
    if let Some(to) = replacements.last().and_then(|r| r.version_to) {
        if Boundary::At(to) != record_to {
            return Err(MasterError::BoundaryMismatch {
                expected: record_to,
                actual: Boundary::At(to),
            });
        }
    }

    Ok(SplicePlan {
        closes: vec![record.unique_id().clone()],
        inserts: shape(replacements, record_from, record_to)?,
    })
}

/// Plan a splice over the span the replacements cover
///
/// Every active record overlapping `[first.from, last.to)` is closed. The
/// parts of the first and last overlapped records outside the span are
/// re-inserted as remnants with their old payloads.
pub fn plan_splice<T: Clone>(
    active: &[DocumentVersion<T>],
    replacements: Vec<Replacement<T>>,
) -> MasterResult<SplicePlan<T>> {
    let (span_from, span_to) = match (replacements.first(), replacements.last()) {
        (Some(first), Some(last)) => (first.version_from, last.version_to_boundary()),
        _ => return Err(MasterError::invalid_input("replacement list is empty")),
    };
    let span = TimeInterval::new(span_from, span_to)?;

    let overlapped: Vec<&DocumentVersion<T>> = active
        .iter()
        .filter(|r| r.version().overlaps(&span))
        .collect();

    let mut inserts = Vec::with_capacity(replacements.len() + 2);
    if let Some(head) = overlapped.first() {
        if head.version_from() < span.from() {
            inserts.push(PendingVersion {
                version: head.version().with_to(span.from())?,
                payload: head.payload().clone(),
            });
        }
    }
    inserts.extend(shape(replacements, span.from(), span.to())?);
    if let (Some(tail), Some(end)) = (overlapped.last(), span.to_instant()) {
        if tail.version().to() > span.to() {
            inserts.push(PendingVersion {
                version: tail.version().with_from(end)?,
                payload: tail.payload().clone(),
            });
        }
    }

    Ok(SplicePlan {
        closes: overlapped.iter().map(|r| r.unique_id().clone()).collect(),
        inserts,
    })
}

/// Plan the termination of a lineage at `at`
///
/// The latest record must be open-ended and start before `at`.
pub fn plan_terminate<T: Clone>(
    object_id: &ObjectId,
    active: &[DocumentVersion<T>],
    at: Timestamp,
) -> MasterResult<SplicePlan<T>> {
    let latest = active
        .last()
        .ok_or_else(|| MasterError::not_found(object_id.to_string()))?;
    if !latest.version().is_open_ended() {
        return Err(MasterError::invalid_input(format!(
            "{} already ends at {}",
            object_id,
            latest.version().to()
        )));
    }
    if at <= latest.version_from() {
        return Err(MasterError::invalid_input(format!(
            "cannot end {} at {}, latest version starts at {}",
            object_id,
            at,
            latest.version_from()
        )));
    }
    Ok(SplicePlan {
        closes: vec![latest.unique_id().clone()],
        inserts: vec![PendingVersion {
            version: latest.version().with_to(at)?,
            payload: latest.payload().clone(),
        }],
    })
}

/// Simulate the slice a plan would produce and check that it tiles
///
/// A gap is the caller's fault (`NonExactRange`); an overlap means the
/// planner itself is wrong (`CorruptTimeline`).
pub fn check_plan<T>(
    object_id: &ObjectId,
    active: &[DocumentVersion<T>],
    plan: &SplicePlan<T>,
) -> MasterResult<()> {
    let mut intervals: Vec<TimeInterval> = active
        .iter()
        .filter(|r| !plan.closes.contains(r.unique_id()))
        .map(|r| *r.version())
        .chain(plan.inserts.iter().map(|p| p.version))
        .collect();
    intervals.sort_by_key(|interval| interval.from());

    for pair in intervals.windows(2) {
        let expected = Boundary::At(pair[1].from());
        let actual = pair[0].to();
        if actual < expected {
            return Err(MasterError::non_exact_range(
                object_id,
                format!("result would leave a gap between {} and {}", pair[0], pair[1]),
            ));
        }
        if actual > expected {
            return Err(MasterError::corrupt(
                object_id,
                format!("planned overlap between {} and {}", pair[0], pair[1]),
            ));
        }
    }
    Ok(())
}

/// Executes write plans against a store, one object at a time
pub struct SpliceEngine<T, S> {
    store: Arc<S>,
    coordinator: Arc<WriteCoordinator>,
    clock: Arc<dyn Clock>,
    max_replacements: usize,
    verify_commits: bool,
    _payload: PhantomData<fn() -> T>,
}

impl<T, S> Clone for SpliceEngine<T, S> {
    fn clone(&self) -> Self {
        SpliceEngine {
            store: Arc::clone(&self.store),
            coordinator: Arc::clone(&self.coordinator),
            clock: Arc::clone(&self.clock),
            max_replacements: self.max_replacements,
            verify_commits: self.verify_commits,
            _payload: PhantomData,
        }
    }
}

impl<T, S> std::fmt::Debug for SpliceEngine<T, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpliceEngine")
            .field("clock", &self.clock)
            .field("max_replacements", &self.max_replacements)
            .field("verify_commits", &self.verify_commits)
            .finish()
    }
}

impl<T, S> SpliceEngine<T, S>
where
    T: Clone + Send + Sync,
    S: DocumentStore<T>,
{
    /// Create an engine writing to `store`
    pub fn new(
        store: Arc<S>,
        coordinator: Arc<WriteCoordinator>,
        clock: Arc<dyn Clock>,
        max_replacements: usize,
        verify_commits: bool,
    ) -> Self {
        SpliceEngine {
            store,
            coordinator,
            clock,
            max_replacements,
            verify_commits,
            _payload: PhantomData,
        }
    }

    /// Same store and locks, different clock
    pub fn with_clock(&self, clock: Arc<dyn Clock>) -> Self {
        SpliceEngine {
            clock,
            ..self.clone()
        }
    }

    /// The clock stamping corrections
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Create the first record of `object_id`
    pub fn add(
        &self,
        object_id: &ObjectId,
        payload: T,
        version: TimeInterval,
    ) -> MasterResult<DocumentVersion<T>> {
        self.coordinator.execute(object_id, "add", || {
            if self.store.contains(object_id) {
                return Err(MasterError::invalid_input(format!(
                    "{} already has versions",
                    object_id
                )));
            }
            let plan = SplicePlan {
                closes: Vec::new(),
                inserts: vec![PendingVersion { version, payload }],
            };
            let mut inserted = self.commit(object_id, &[], plan)?;
            inserted
                .pop()
                .ok_or_else(|| MasterError::corrupt(object_id, "creation inserted nothing"))
        })
    }

    /// Replace the active records exactly covering `target`
    pub fn replace_versions(
        &self,
        object_id: &ObjectId,
        target: &TimeInterval,
        replacements: Vec<Replacement<T>>,
    ) -> MasterResult<Vec<DocumentVersion<T>>> {
        validate_replacements(&replacements, self.max_replacements)?;
        self.coordinator.execute(object_id, "replace_versions", || {
            let active = self.store.load_active_slice(object_id)?;
            let plan = plan_exact_replace(object_id, &active, target, replacements)?;
            self.commit(object_id, &active, plan)
        })
    }

    /// Replace one active record
    pub fn replace_version(
        &self,
        unique_id: &UniqueId,
        replacements: Vec<Replacement<T>>,
    ) -> MasterResult<Vec<DocumentVersion<T>>> {
        validate_replacements(&replacements, self.max_replacements)?;
        let object_id = unique_id.object_id();
        self.coordinator.execute(object_id, "replace_version", || {
            let record = self.store.load_record(unique_id)?;
            let plan = plan_single_replace(&record, replacements)?;
            let active = self.store.load_active_slice(object_id)?;
            self.commit(object_id, &active, plan)
        })
    }

    /// Splice replacements over the span they cover
    pub fn splice(
        &self,
        object_id: &ObjectId,
        replacements: Vec<Replacement<T>>,
    ) -> MasterResult<Vec<DocumentVersion<T>>> {
        validate_replacements(&replacements, self.max_replacements)?;
        self.coordinator.execute(object_id, "splice", || {
            let active = self.store.load_active_slice(object_id)?;
            let plan = plan_splice(&active, replacements)?;
            self.commit(object_id, &active, plan)
        })
    }

    /// New version from `version_from` onwards
    ///
    /// Must start after the latest record's `version_from`.
    pub fn update(
        &self,
        object_id: &ObjectId,
        payload: T,
        version_from: Timestamp,
    ) -> MasterResult<DocumentVersion<T>> {
        self.coordinator.execute(object_id, "update", || {
            let active = self.store.load_active_slice(object_id)?;
            let latest = active
                .last()
                .ok_or_else(|| MasterError::not_found(object_id.to_string()))?;
            if version_from <= latest.version_from() {
                return Err(MasterError::invalid_input(format!(
                    "update of {} at {} must start after latest version_from {}",
                    object_id,
                    version_from,
                    latest.version_from()
                )));
            }
            let plan = plan_splice(&active, vec![Replacement::new(payload, version_from)])?;
            self.commit(object_id, &active, plan)?
                .into_iter()
                .find(|r| r.version_from() == version_from)
                .ok_or_else(|| MasterError::corrupt(object_id, "update inserted nothing"))
        })
    }

    /// Replace the payload of one active record, keeping its interval
    pub fn correct(&self, unique_id: &UniqueId, payload: T) -> MasterResult<DocumentVersion<T>> {
        let object_id = unique_id.object_id();
        self.coordinator.execute(object_id, "correct", || {
            let record = self.store.load_record(unique_id)?;
            let replacement = Replacement::new(payload, record.version_from());
            let plan = plan_single_replace(&record, vec![replacement])?;
            let active = self.store.load_active_slice(object_id)?;
            let mut inserted = self.commit(object_id, &active, plan)?;
            inserted
                .pop()
                .ok_or_else(|| MasterError::corrupt(object_id, "correction inserted nothing"))
        })
    }

    /// End the lineage at `at`
    pub fn terminate(&self, object_id: &ObjectId, at: Timestamp) -> MasterResult<DocumentVersion<T>> {
        self.coordinator.execute(object_id, "remove", || {
            let active = self.store.load_active_slice(object_id)?;
            let plan = plan_terminate(object_id, &active, at)?;
            let mut inserted = self.commit(object_id, &active, plan)?;
            inserted
                .pop()
                .ok_or_else(|| MasterError::corrupt(object_id, "termination inserted nothing"))
        })
    }

    /// Check, stamp and commit a plan; caller holds the object lock
    fn commit(
        &self,
        object_id: &ObjectId,
        active: &[DocumentVersion<T>],
        plan: SplicePlan<T>,
    ) -> MasterResult<Vec<DocumentVersion<T>>> {
        check_plan(object_id, active, &plan)?;

        let correction = self.store.next_correction(object_id, self.clock.now());
        debug!(
            target: "masterdb::splice",
            object_id = %object_id,
            correction = %correction,
            closed = plan.closes.len(),
            inserted = plan.inserts.len(),
            "Committing splice plan"
        );
        let batch = plan.into_batch(object_id.clone(), correction)?;
        let inserted = self.store.commit_batch(batch)?;

        if self.verify_commits {
            let after = self.store.load_active_slice(object_id)?;
            let refs: Vec<&DocumentVersion<T>> = after.iter().collect();
            if let Err(err) = check_partition(object_id, &refs) {
                error!(
                    target: "masterdb::splice",
                    object_id = %object_id,
                    correction = %correction,
                    error = %err,
                    "Active slice broken after commit"
                );
                return Err(err);
            }
        }
        Ok(inserted)
    }
}
