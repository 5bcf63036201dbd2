//! Splices over the five-version exchange lineage

use crate::common::*;
use masterdb::{Replacement, Timestamp, VersionCorrection};
use std::time::Duration;

fn replacement(i: usize, from: Timestamp) -> Replacement<Exchange> {
    Replacement::new(exchange(&format!("test{}", i)), from)
}

#[test]
fn splice_from_latest_version_extends_timeline() {
    let fixture = setup_test_data();
    let latest = fixture
        .master
        .get(&fixture.object_id, VersionCorrection::LATEST)
        .unwrap();
    assert_eq!(latest.version_from(), plus_mins(4));

    let replacements = (0..=10u64)
        .map(|i| {
            let from = latest.version_from().saturating_add(Duration::from_secs(i));
            replacement(i as usize, from)
        })
        .collect();
    fixture.master.splice(&fixture.object_id, replacements).unwrap();

    let history = history_since_correction(&fixture);
    assert_eq!(history.len(), 15);
    assert_eq!(history[0].payload().name, "test10");
    assert_eq!(history[0].version_from(), plus_secs(4 * 60 + 10));
    assert_eq!(history[0].version_to(), None);
}

#[test]
fn splice_from_before_latest_version_swallows_later_versions() {
    let fixture = setup_test_data();

    // +1m, +2m, ... +11m
    let replacements = (0..=10u64)
        .map(|i| replacement(i as usize, plus_mins(i + 1)))
        .collect();
    fixture.master.splice(&fixture.object_id, replacements).unwrap();

    let history = history_since_correction(&fixture);
    assert_eq!(history.len(), 12);
    assert_eq!(history.last().unwrap().payload().name, "setup_0 corrected");
    assert_eq!(history[0].version_from(), plus_mins(11));
}

#[test]
fn splice_open_ended_inside_a_version_keeps_head_remnant() {
    let fixture = setup_test_data();

    let replacements = (1..=4u64)
        .map(|i| replacement(i as usize, plus_secs(60 + 20 * i)))
        .collect();
    fixture.master.splice(&fixture.object_id, replacements).unwrap();

    let history = history_since_correction(&fixture);
    assert_eq!(history.len(), 6);

    let mut ascending = history.clone();
    ascending.reverse();
    assert_eq!(
        bounds(&ascending),
        vec![
            (T0, Some(plus_mins(1))),
            (plus_mins(1), Some(plus_secs(80))),
            (plus_secs(80), Some(plus_secs(100))),
            (plus_secs(100), Some(plus_mins(2))),
            (plus_mins(2), Some(plus_secs(140))),
            (plus_secs(140), None),
        ]
    );
    assert_eq!(ascending[1].payload().name, "setup_1");

    let latest = fixture
        .master
        .get(&fixture.object_id, VersionCorrection::LATEST)
        .unwrap();
    assert_eq!(latest.version_from(), plus_secs(140));
    assert_eq!(latest.payload().name, "test4");
}

#[test]
fn splice_bounded_inside_versions_keeps_both_remnants() {
    let fixture = setup_test_data();

    let mut replacements: Vec<_> = (1..=4u64)
        .map(|i| replacement(i as usize, plus_secs(60 + 20 * i)))
        .collect();
    if let Some(last) = replacements.pop() {
        replacements.push(last.until(plus_secs(160)));
    }
    fixture.master.splice(&fixture.object_id, replacements).unwrap();

    let history = history_since_correction(&fixture);
    assert_eq!(history.len(), 9);

    let mut ascending = history.clone();
    ascending.reverse();
    assert_eq!(
        bounds(&ascending),
        vec![
            (T0, Some(plus_mins(1))),
            (plus_mins(1), Some(plus_secs(80))),
            (plus_secs(80), Some(plus_secs(100))),
            (plus_secs(100), Some(plus_mins(2))),
            (plus_mins(2), Some(plus_secs(140))),
            (plus_secs(140), Some(plus_secs(160))),
            (plus_secs(160), Some(plus_mins(3))),
            (plus_mins(3), Some(plus_mins(4))),
            (plus_mins(4), None),
        ]
    );
    assert_eq!(ascending[6].payload().name, "setup_2");
    assert_eq!(ascending[8].payload().name, "setup_4");
}

#[test]
fn splice_starting_before_first_version_extends_backwards() {
    let fixture = setup_test_data();

    // -30s, 0, +30s, +60s, the last one ending at +90s
    let mut replacements: Vec<_> = (1..=4u64)
        .map(|i| {
            let offset = 30 * i;
            let from = if offset < 60 {
                minus_secs(60 - offset)
            } else {
                plus_secs(offset - 60)
            };
            replacement(i as usize, from)
        })
        .collect();
    if let Some(last) = replacements.pop() {
        replacements.push(last.until(plus_secs(90)));
    }
    fixture.master.splice(&fixture.object_id, replacements).unwrap();

    let history = history_since_correction(&fixture);
    assert_eq!(history.len(), 8);

    let mut ascending = history.clone();
    ascending.reverse();
    assert_eq!(
        bounds(&ascending),
        vec![
            (minus_secs(30), Some(T0)),
            (T0, Some(plus_secs(30))),
            (plus_secs(30), Some(plus_secs(60))),
            (plus_secs(60), Some(plus_secs(90))),
            (plus_secs(90), Some(plus_mins(2))),
            (plus_mins(2), Some(plus_mins(3))),
            (plus_mins(3), Some(plus_mins(4))),
            (plus_mins(4), None),
        ]
    );
    assert_eq!(ascending[4].payload().name, "setup_1");
}
