//! Tests for reference index load statistics

use crate::app::services::reference_index::LoadStats;
use std::time::Duration;

#[test]
fn test_load_stats_new() {
    let stats = LoadStats::new();
    assert_eq!(stats.rows_read, 0);
    assert_eq!(stats.records_loaded, 0);
    assert_eq!(stats.rows_skipped, 0);
    assert_eq!(stats.duplicates, 0);
    assert_eq!(stats.load_duration, Duration::ZERO);
    assert!(!stats.has_errors());
    assert_eq!(stats.rejection_rate(), 0.0);
}

#[test]
fn test_load_stats_calculations() {
    let mut stats = LoadStats::new();
    stats.rows_read = 200;
    stats.records_loaded = 150;
    stats.rows_skipped = 30;
    stats.duplicates = 20;
    stats.load_duration = Duration::from_millis(1500);

    assert_eq!(stats.rejection_rate(), 25.0);

    stats.errors.push("row 4: missing value for XLambert93".to_string());
    assert!(stats.has_errors());

    let summary = stats.summary();
    assert!(summary.contains("150 reference points"));
    assert!(summary.contains("200 rows"));
    assert!(summary.contains("30 skipped"));
    assert!(summary.contains("20 duplicates"));
    assert!(summary.contains("1.50s"));
}
