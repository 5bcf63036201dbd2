//! Random edit sequences keep every slice a partition

use crate::common::*;
use masterdb::{
    DocumentMaster, DocumentStore, MasterError, MasterResult, ObjectId, Replacement,
    TimeInterval, VersionCorrection,
};
use proptest::prelude::*;

/// Edits expressed in seconds after `T0`
#[derive(Debug, Clone)]
pub enum Edit {
    Update(u64),
    Splice(Vec<u64>, Option<u64>),
    Correct(u64),
    ReplaceVersions(u64, u64),
    Remove(u64),
}

pub fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        3 => (0u64..600).prop_map(Edit::Update),
        3 => (prop::collection::btree_set(0u64..600, 1..5), prop::option::of(0u64..600))
            .prop_map(|(froms, to)| Edit::Splice(froms.into_iter().collect(), to)),
        2 => (0u64..600).prop_map(Edit::Correct),
        2 => (0u64..600, 0u64..600).prop_map(|(a, b)| Edit::ReplaceVersions(a, b)),
        1 => (0u64..600).prop_map(Edit::Remove),
    ]
}

/// Apply one edit; caller errors are part of the expected outcome
pub fn apply(
    master: &DocumentMaster<Exchange>,
    object_id: &ObjectId,
    step: usize,
    edit: &Edit,
) -> MasterResult<()> {
    let name = format!("step_{}", step);
    match edit {
        Edit::Update(at) => master
            .update(object_id, exchange(&name), Some(plus_secs(*at)))
            .map(|_| ()),
        Edit::Splice(froms, to) => {
            let mut replacements: Vec<_> = froms
                .iter()
                .map(|from| Replacement::new(exchange(&name), plus_secs(*from)))
                .collect();
            if let (Some(last), Some(to)) = (replacements.pop(), to) {
                replacements.push(last.until(plus_secs(*to)));
            }
            master.splice(object_id, replacements).map(|_| ())
        }
        Edit::Correct(at) => {
            let record = master.get(object_id, VersionCorrection::of_version(plus_secs(*at)))?;
            master.correct(record.unique_id(), exchange(&name)).map(|_| ())
        }
        Edit::ReplaceVersions(a, b) => {
            let slice = master.slice_at(object_id, None)?;
            let (lo, hi) = (*a.min(b) as usize, *a.max(b) as usize);
            let first = &slice[lo % slice.len()];
            let last = &slice[(hi % slice.len()).max(lo % slice.len())];
            let target = TimeInterval::new(first.version_from(), last.version().to())?;
            master
                .replace_versions(
                    object_id,
                    &target,
                    vec![Replacement::new(exchange(&name), first.version_from())],
                )
                .map(|_| ())
        }
        Edit::Remove(at) => master.remove(object_id, Some(plus_secs(*at))).map(|_| ()),
    }
}

pub fn new_lineage() -> (DocumentMaster<Exchange>, ObjectId) {
    let master = exchange_master(fixed_clock(T0));
    let created = master.add(exchange("created"), T0, None).unwrap();
    let object_id = created.object_id().clone();
    (master, object_id)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_slice_stays_a_partition(edits in prop::collection::vec(edit_strategy(), 1..25)) {
        let (master, object_id) = new_lineage();

        for (step, edit) in edits.iter().enumerate() {
            let before = master.store().record_count();
            match apply(&master, &object_id, step, edit) {
                Ok(()) => {}
                Err(err) => {
                    let corrupt = matches!(err, MasterError::CorruptTimeline { .. });
                    prop_assert!(!corrupt, "{:?} gave {:?}", edit, err);
                    prop_assert!(err.is_caller_error(), "{:?} gave {:?}", edit, err);
                    prop_assert_eq!(master.store().record_count(), before);
                }
            }
            master.store().verify_all().unwrap();
        }

        // the latest slice starts where the lineage was created
        let active = master.slice_at(&object_id, None).unwrap();
        prop_assert!(!active.is_empty());
        prop_assert!(active[0].version_from() <= T0);
        for pair in active.windows(2) {
            prop_assert_eq!(pair[0].version().to(), masterdb::Boundary::At(pair[1].version_from()));
        }
        let latest = master.store().latest_correction(&object_id).unwrap();
        prop_assert!(active.iter().all(|r| r.correction_from() <= latest));
    }

    #[test]
    fn failed_edits_leave_no_trace(edits in prop::collection::vec(edit_strategy(), 1..15)) {
        let (master, object_id) = new_lineage();
        for (step, edit) in edits.iter().enumerate() {
            let history_before = full(&master, &object_id);
            if apply(&master, &object_id, step, edit).is_err() {
                prop_assert_eq!(full(&master, &object_id), history_before);
            }
        }
    }
}

fn full(master: &DocumentMaster<Exchange>, object_id: &ObjectId) -> Vec<masterdb::DocumentVersion<Exchange>> {
    master
        .history(&masterdb::HistoryRequest::new(object_id.clone()).unpaged())
        .unwrap()
        .documents
}

#[test]
fn terminated_lineage_stays_a_partition() {
    let (master, object_id) = new_lineage();
    master.update(&object_id, exchange("second"), Some(plus_secs(60))).unwrap();
    let last = master.remove(&object_id, Some(plus_secs(120))).unwrap();
    assert_eq!(last.version_to(), Some(plus_secs(120)));

    let err = master.remove(&object_id, Some(plus_secs(180))).unwrap_err();
    assert!(matches!(err, MasterError::InvalidInput(_)));

    let err = master
        .get(&object_id, VersionCorrection::of_version(plus_secs(150)))
        .unwrap_err();
    assert!(matches!(err, MasterError::NotFound(_)));
    master.store().verify_all().unwrap();
}
