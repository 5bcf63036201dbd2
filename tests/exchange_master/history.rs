//! History paging over the exchange lineage

use crate::common::*;
use masterdb::{HistoryPage, HistoryRequest, TimeInterval};

#[test]
fn history_orders_newest_version_then_newest_correction() {
    let fixture = setup_test_data();
    let history = full_history(&fixture);

    assert_eq!(
        names(&history),
        vec![
            "setup_4",
            "setup_3",
            "setup_3",
            "setup_2",
            "setup_2",
            "setup_1",
            "setup_1",
            "setup_0 corrected",
            "setup_0",
            "setup_0",
        ]
    );
    for pair in history.windows(2) {
        assert!(pair[0].version_from() >= pair[1].version_from());
        if pair[0].version_from() == pair[1].version_from() {
            assert!(pair[0].correction_from() > pair[1].correction_from());
        }
    }
}

#[test]
fn history_pages_cover_all_records_once() {
    let fixture = setup_test_data();
    let full = full_history(&fixture);

    let mut collected = Vec::new();
    let mut first_item = 0;
    loop {
        let page = fixture
            .master
            .history(&HistoryRequest::new(fixture.object_id.clone()).page(first_item, Some(3)))
            .unwrap();
        assert_eq!(page.paging.total_items, full.len());
        collected.extend(page.documents.iter().cloned());
        if !page.paging.has_more() {
            break;
        }
        first_item += 3;
    }
    assert_eq!(collected, full);
}

#[test]
fn history_filtered_by_version_window() {
    let fixture = setup_test_data();
    let window = TimeInterval::bounded(plus_mins(3), plus_mins(5)).unwrap();
    let page = fixture
        .master
        .history(
            &HistoryRequest::new(fixture.object_id.clone())
                .versions(window)
                .corrections_from(plus_mins(120))
                .unpaged(),
        )
        .unwrap();
    assert_eq!(names(&page.documents), vec!["setup_4", "setup_3"]);
}

#[test]
fn history_page_serializes_to_json() {
    let fixture = setup_test_data();
    let page = fixture
        .master
        .history(&HistoryRequest::new(fixture.object_id.clone()).page(0, Some(2)))
        .unwrap();

    let json = serde_json::to_value(&page).unwrap();
    assert_eq!(json["paging"]["total_items"], 10);
    assert_eq!(json["documents"][0]["payload"]["name"], "setup_4");

    let back: HistoryPage<Exchange> = serde_json::from_value(json).unwrap();
    assert_eq!(back, page);
}
