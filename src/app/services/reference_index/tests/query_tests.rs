//! Tests for reference index search functionality

use super::*;
use crate::app::services::reference_index::ReferenceIndex;

fn create_test_index() -> ReferenceIndex {
    ReferenceIndex::from_records(vec![
        create_test_record("597120", "BA", "Site A", 600000.0, 6700000.0),
        create_test_record("597120", "BB", "Site B", 601000.0, 6701000.0),
        create_test_record("142091", "AO", "Monument de Langres", 848750.0, 6760430.0),
        create_test_record("393314", "BA", "Château de Rambouillet", 614123.0, 6836420.0),
    ])
}

#[test]
fn test_search_by_primary() {
    let index = create_test_index();
    let results = index.search(Some("597120"), None);

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].secondary, "BA");
    assert_eq!(results[1].secondary, "BB");
}

#[test]
fn test_search_by_secondary_case_insensitive() {
    let index = create_test_index();
    let results = index.search(None, Some("ba"));

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].primary, "393314");
    assert_eq!(results[1].primary, "597120");
}

#[test]
fn test_search_by_both_codes() {
    let index = create_test_index();
    let results = index.search(Some("142091"), Some("AO"));

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].label, "Monument de Langres");
    assert!(index.search(Some("142091"), Some("BA")).is_empty());
}

#[test]
fn test_search_without_filters_returns_all_sorted() {
    let index = create_test_index();
    let results = index.search(None, None);

    assert_eq!(results.len(), 4);
    assert_eq!(results, index.records());
    assert_eq!(results[0].primary, "142091");
}

#[test]
fn test_find_by_label() {
    let index = create_test_index();
    let results = index.find_by_label("site");

    assert_eq!(results.len(), 2);
    assert!(index.find_by_label("château").len() == 1);
    assert!(index.find_by_label("nowhere").is_empty());
}

#[test]
fn test_from_records_keeps_first_duplicate() {
    let index = ReferenceIndex::from_records(vec![
        create_test_record("597120", "BA", "First", 600000.0, 6700000.0),
        create_test_record("597120", "ba", "Second", 0.0, 0.0),
    ]);

    assert_eq!(index.len(), 1);
    assert_eq!(index.get("597120", "BA").unwrap().label, "First");
}
