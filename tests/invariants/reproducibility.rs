//! Past slices never change once written

use crate::common::*;
use crate::partition::{apply, edit_strategy, new_lineage};
use masterdb::{DocumentVersion, Replacement, TimeInterval, Timestamp, UniqueId, VersionCorrection};
use proptest::prelude::*;
use std::collections::BTreeMap;

/// What a slice asserted when it was read; later closes only set `correction_to`
type Belief = (UniqueId, TimeInterval, Timestamp, Exchange);

fn beliefs(slice: &[DocumentVersion<Exchange>]) -> Vec<Belief> {
    slice
        .iter()
        .map(|r| (r.unique_id().clone(), *r.version(), r.correction_from(), r.payload().clone()))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn past_slices_are_reproducible(edits in prop::collection::vec(edit_strategy(), 1..20)) {
        let (master, object_id) = new_lineage();
        let mut seen: BTreeMap<Timestamp, Vec<Belief>> = BTreeMap::new();

        for (step, edit) in edits.iter().enumerate() {
            let _ = apply(&master, &object_id, step, edit);
            let latest = master.slice_at(&object_id, None).unwrap();
            let stamp = latest.iter().map(|r| r.correction_from()).max().unwrap();
            seen.entry(stamp).or_insert_with(|| beliefs(&latest));
        }

        for (instant, slice) in &seen {
            let replayed = master.slice_at(&object_id, Some(*instant)).unwrap();
            prop_assert!(replayed.iter().all(|r| r.correction().contains(*instant)));
            prop_assert_eq!(&beliefs(&replayed), slice);
        }
    }

    #[test]
    fn point_reads_are_idempotent(
        edits in prop::collection::vec(edit_strategy(), 1..10),
        at_secs in 0u64..700,
    ) {
        let (master, object_id) = new_lineage();
        for (step, edit) in edits.iter().enumerate() {
            let _ = apply(&master, &object_id, step, edit);
        }
        let coordinate = VersionCorrection::of_version(plus_secs(at_secs));
        let first = master.get(&object_id, coordinate).ok();
        let second = master.get(&object_id, coordinate).ok();
        prop_assert_eq!(first, second);
    }
}

#[test]
fn replaced_range_reads_back_replacements() {
    let (master, object_id) = new_lineage();
    master.update(&object_id, exchange("later"), Some(plus_secs(300))).unwrap();

    let replacements = vec![
        Replacement::new(exchange("a"), plus_secs(60)),
        Replacement::new(exchange("b"), plus_secs(120)),
        Replacement::new(exchange("c"), plus_secs(180)).until(plus_secs(240)),
    ];
    master.splice(&object_id, replacements).unwrap();

    let at = |secs| {
        master
            .get(&object_id, VersionCorrection::of_version(plus_secs(secs)))
            .unwrap()
            .into_payload()
            .name
    };
    assert_eq!(at(0), "created");
    assert_eq!(at(60), "a");
    assert_eq!(at(179), "b");
    assert_eq!(at(200), "c");
    assert_eq!(at(240), "created");
    assert_eq!(at(400), "later");
}

#[test]
fn correction_before_edit_still_reads_old_value() {
    let (master, object_id) = new_lineage();
    let before = master.slice_at(&object_id, None).unwrap();
    let stamp = before[0].correction_from();

    let record = master.get(&object_id, VersionCorrection::LATEST).unwrap();
    master.correct(record.unique_id(), exchange("fixed")).unwrap();

    let old = master
        .get(&object_id, VersionCorrection::at(plus_secs(10), stamp))
        .unwrap();
    assert_eq!(old.payload().name, "created");
    let new = master
        .get(&object_id, VersionCorrection::of_version(plus_secs(10)))
        .unwrap();
    assert_eq!(new.payload().name, "fixed");
}
