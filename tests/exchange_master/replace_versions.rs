//! Exact-range replaces over the exchange lineage

use crate::common::*;
use masterdb::{MasterError, Replacement, TimeInterval, VersionCorrection};

#[test]
fn replace_open_ended_latest_range() {
    let fixture = setup_test_data();
    let target = TimeInterval::open(plus_mins(4));

    let replacements = (1..=4u64)
        .map(|i| Replacement::new(exchange(&format!("test{}", i)), plus_secs(240 + 20 * i)))
        .collect();
    fixture
        .master
        .replace_versions(&fixture.object_id, &target, replacements)
        .unwrap();

    let slice = fixture.master.slice_at(&fixture.object_id, None).unwrap();
    assert_eq!(
        bounds(&slice[4..]),
        vec![
            (plus_mins(4), Some(plus_secs(280))),
            (plus_secs(280), Some(plus_secs(300))),
            (plus_secs(300), Some(plus_secs(320))),
            (plus_secs(320), None),
        ]
    );
    assert_eq!(slice[4].payload().name, "test1");
}

#[test]
fn replace_two_interior_versions_with_one() {
    let fixture = setup_test_data();
    let target = TimeInterval::bounded(plus_mins(1), plus_mins(3)).unwrap();

    let inserted = fixture
        .master
        .replace_versions(
            &fixture.object_id,
            &target,
            vec![Replacement::new(exchange("merged"), plus_mins(1))],
        )
        .unwrap();
    assert_eq!(inserted.len(), 1);
    assert_eq!(inserted[0].version(), &target);

    let slice = fixture.master.slice_at(&fixture.object_id, None).unwrap();
    assert_eq!(slice.len(), 4);
    let merged = fixture
        .master
        .get(&fixture.object_id, VersionCorrection::of_version(plus_secs(150)))
        .unwrap();
    assert_eq!(merged.payload().name, "merged");
}

#[test]
fn target_inside_a_version_is_not_exact() {
    let fixture = setup_test_data();
    let target = TimeInterval::bounded(plus_secs(90), plus_mins(3)).unwrap();

    let err = fixture
        .master
        .replace_versions(
            &fixture.object_id,
            &target,
            vec![Replacement::new(exchange("x"), plus_secs(90))],
        )
        .unwrap_err();
    assert!(matches!(err, MasterError::NonExactRange { .. }), "{:?}", err);

    let target = TimeInterval::bounded(plus_mins(1), plus_secs(150)).unwrap();
    let err = fixture
        .master
        .replace_versions(
            &fixture.object_id,
            &target,
            vec![Replacement::new(exchange("x"), plus_mins(1))],
        )
        .unwrap_err();
    assert!(matches!(err, MasterError::NonExactRange { .. }), "{:?}", err);
}

#[test]
fn explicit_end_is_anchored_to_target() {
    let fixture = setup_test_data();
    let target = TimeInterval::bounded(plus_mins(2), plus_mins(3)).unwrap();

    let inserted = fixture
        .master
        .replace_versions(
            &fixture.object_id,
            &target,
            vec![Replacement::new(exchange("x"), plus_mins(2)).until(plus_secs(170))],
        )
        .unwrap();
    assert_eq!(inserted[0].version_to(), Some(plus_mins(3)));
    fixture.master.store().verify_all().unwrap();
}
