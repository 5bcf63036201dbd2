//! Per-object bitemporal timeline
//!
//! A `Timeline<T>` owns every record ever written for one `ObjectId`, in
//! commit order. It is append-only on the correction axis: records are
//! inserted or closed, never removed.
//!
//! # Slices
//!
//! The slice at a correction instant `c` is the set of records whose
//! correction window contains `c`. Every slice must tile version time:
//!
//! ```text
//!   version ─────────────────────────────────────────────────────────▶
//!   [v0 ─── v1)[v1 ──────── v2)[v2 ─── v3)[v3 ──────────────────── ∞)
//! ```
//!
//! Slices are re-validated on every read. A violation is reported as
//! `CorruptTimeline` and never repaired.
//!
//! # Writes
//!
//! `apply` is the only write path. It projects the intervals of the next
//! active slice, validates them, and only then closes and appends in place,
//! so a failed batch leaves the timeline exactly as it was. The cost of a
//! batch is bounded by the active slice and the batch, not by history.

use masterdb_core::{
    Boundary, CorrectionBatch, DocumentVersion, MasterError, MasterResult, ObjectId,
    TimeInterval, Timestamp, UniqueId,
};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeMap;

/// All records of one document lineage
#[derive(Debug, Clone)]
pub struct Timeline<T> {
    object_id: ObjectId,
    /// Records in commit order
    records: Vec<DocumentVersion<T>>,
    /// Position in `records` by unique id
    by_id: FxHashMap<UniqueId, usize>,
    /// Active records by `version_from`
    active: BTreeMap<Timestamp, usize>,
    /// Correction instant of the newest batch
    latest_correction: Option<Timestamp>,
    /// Next unique-id version to assign
    next_version: u64,
}

impl<T> Timeline<T> {
    /// Create an empty timeline for `object_id`
    pub fn new(object_id: ObjectId) -> Self {
        Timeline {
            object_id,
            records: Vec::new(),
            by_id: FxHashMap::default(),
            active: BTreeMap::new(),
            latest_correction: None,
            next_version: 0,
        }
    }

    /// The lineage this timeline records
    pub fn object_id(&self) -> &ObjectId {
        &self.object_id
    }

    /// Number of records ever written
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True before the first record is added
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every record in commit order, current and superseded
    pub fn records(&self) -> &[DocumentVersion<T>] {
        &self.records
    }

    /// Newest correction instant in the timeline
    pub fn latest_correction(&self) -> Option<Timestamp> {
        self.latest_correction
    }

    /// Correction stamp for the next batch
    ///
    /// Correction instants are strictly increasing per object, so a clock
    /// reading at or before the newest stamp is bumped one microsecond past it.
    pub fn next_correction_instant(&self, now: Timestamp) -> Timestamp {
        match self.latest_correction {
            Some(latest) if now <= latest => latest.next_micro(),
            _ => now,
        }
    }

    /// Records visible at correction instant `correction`, by `version_from`
    pub fn current_slice(&self, correction: Timestamp) -> MasterResult<Vec<&DocumentVersion<T>>> {
        let mut slice: Vec<&DocumentVersion<T>> = self
            .records
            .iter()
            .filter(|r| r.correction().contains(correction))
            .collect();
        slice.sort_by_key(|r| r.version_from());
        check_partition(&self.object_id, &slice)?;
        Ok(slice)
    }

    /// Records whose correction window is still open, by `version_from`
    pub fn active_slice(&self) -> MasterResult<Vec<&DocumentVersion<T>>> {
        let slice: Vec<&DocumentVersion<T>> =
            self.active.values().map(|&idx| &self.records[idx]).collect();
        check_partition(&self.object_id, &slice)?;
        Ok(slice)
    }

    /// The record covering `version` in the slice selected by `correction`
    ///
    /// `None` for `correction` selects the active slice.
    pub fn get(
        &self,
        version: Timestamp,
        correction: Option<Timestamp>,
    ) -> MasterResult<&DocumentVersion<T>> {
        let slice = match correction {
            Some(instant) => self.current_slice(instant)?,
            None => self.active_slice()?,
        };
        // Slices are sorted and contiguous, so the candidate is the last
        // record starting at or before `version`.
        let idx = slice.partition_point(|r| r.version_from() <= version);
        match idx.checked_sub(1).map(|i| slice[i]) {
            Some(record) if record.version().contains(version) => Ok(record),
            _ => Err(MasterError::not_found(format!(
                "{} has no record at version {} (correction {})",
                self.object_id,
                version,
                correction.map_or_else(|| "LATEST".to_string(), |c| c.to_string())
            ))),
        }
    }

    /// One record by unique id
    pub fn record(&self, unique_id: &UniqueId) -> MasterResult<&DocumentVersion<T>> {
        self.by_id
            .get(unique_id)
            .map(|&idx| &self.records[idx])
            .ok_or_else(|| MasterError::not_found(unique_id.to_string()))
    }

    /// Records overlapping both windows, newest view first
    ///
    /// Ordered by `version_from` descending, then `correction_from` descending.
    pub fn history(
        &self,
        versions: Option<&TimeInterval>,
        corrections: Option<&TimeInterval>,
    ) -> Vec<&DocumentVersion<T>> {
        let mut matching: Vec<&DocumentVersion<T>> = self
            .records
            .iter()
            .filter(|r| versions.map_or(true, |w| r.version().overlaps(w)))
            .filter(|r| corrections.map_or(true, |w| r.correction().overlaps(w)))
            .collect();
        matching.sort_by(|a, b| {
            b.version_from()
                .cmp(&a.version_from())
                .then_with(|| b.correction_from().cmp(&a.correction_from()))
        });
        matching
    }

    /// Check the partition invariant at every correction instant ever used
    pub fn verify(&self) -> MasterResult<()> {
        for record in &self.records {
            if let Some(to) = record.correction_to() {
                if to <= record.correction_from() {
                    return Err(MasterError::corrupt(
                        &self.object_id,
                        format!("{} has an empty correction window", record.unique_id()),
                    ));
                }
            }
            self.current_slice(record.correction_from())?;
        }
        Ok(())
    }
}

impl<T: Clone> Timeline<T> {
    /// Apply a correction batch atomically
    ///
    /// Returns the inserted records with their assigned unique ids.
    pub fn apply(&mut self, batch: CorrectionBatch<T>) -> MasterResult<Vec<DocumentVersion<T>>> {
        let (object_id, correction, closes, inserts) = batch.into_parts();
        if object_id != self.object_id {
            return Err(MasterError::invalid_input(format!(
                "batch for {} applied to timeline of {}",
                object_id, self.object_id
            )));
        }
        if inserts.is_empty() && closes.is_empty() {
            return Err(MasterError::invalid_input("empty correction batch"));
        }
        if let Some(latest) = self.latest_correction {
            if correction <= latest {
                return Err(MasterError::conflict(
                    &self.object_id,
                    format!("correction {} is not after latest correction {}", correction, latest),
                ));
            }
        }

        let mut closing = FxHashSet::default();
        for unique_id in &closes {
            let idx = *self.by_id.get(unique_id).ok_or_else(|| {
                MasterError::conflict(&object_id, format!("{} does not exist", unique_id))
            })?;
            if !self.records[idx].is_current() {
                return Err(MasterError::conflict(
                    &object_id,
                    format!("{} is already superseded", unique_id),
                ));
            }
            closing.insert(idx);
        }

        let mut projected: Vec<TimeInterval> = self
            .active
            .values()
            .filter(|idx| !closing.contains(*idx))
            .map(|&idx| *self.records[idx].version())
            .chain(inserts.iter().map(|pending| pending.version))
            .collect();
        projected.sort_by_key(|interval| interval.from());
        check_tiling(&self.object_id, &projected, |interval| *interval, |interval| {
            interval.to_string()
        })?;

        // `correction` is after every correction_from, so closing succeeds.
        for &idx in &closing {
            let record = &mut self.records[idx];
            self.active.remove(&record.version_from());
            record.close(correction)?;
        }

        let mut inserted = Vec::with_capacity(inserts.len());
        for pending in inserts {
            let unique_id = object_id.at_version(self.next_version.to_string());
            self.next_version += 1;
            let record = DocumentVersion::new(
                unique_id.clone(),
                pending.version,
                TimeInterval::open(correction),
                pending.payload,
            );
            let idx = self.records.len();
            inserted.push(record.clone());
            self.active.insert(record.version_from(), idx);
            self.by_id.insert(unique_id, idx);
            self.records.push(record);
        }
        self.latest_correction = Some(correction);
        Ok(inserted)
    }
}

/// Verify that `slice` (sorted by `version_from`) tiles version time
pub fn check_partition<T>(object_id: &ObjectId, slice: &[&DocumentVersion<T>]) -> MasterResult<()> {
    check_tiling(object_id, slice, |r| *r.version(), |r| {
        format!("{} {}", r.unique_id(), r.version())
    })
}

fn check_tiling<I>(
    object_id: &ObjectId,
    items: &[I],
    interval: impl Fn(&I) -> TimeInterval,
    describe: impl Fn(&I) -> String,
) -> MasterResult<()> {
    for pair in items.windows(2) {
        let expected = Boundary::At(interval(&pair[1]).from());
        let actual = interval(&pair[0]).to();
        if actual != expected {
            let kind = if actual < expected { "gap" } else { "overlap" };
            return Err(MasterError::corrupt(
                object_id,
                format!("{} between {} and {}", kind, describe(&pair[0]), describe(&pair[1])),
            ));
        }
    }
    Ok(())
}
