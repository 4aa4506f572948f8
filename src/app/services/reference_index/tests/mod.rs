//! Shared test utilities and fixtures for reference index tests

use crate::models::ReferenceRecord;
use std::fs;
use std::path::{Path, PathBuf};

pub mod metadata_tests;
pub mod query_tests;

/// Create a reference record with the given identifiers and position
pub fn create_test_record(
    primary: &str,
    secondary: &str,
    label: &str,
    x: f64,
    y: f64,
) -> ReferenceRecord {
    ReferenceRecord {
        primary: primary.to_string(),
        secondary: secondary.to_string(),
        label: label.to_string(),
        x,
        y,
    }
}

/// Write a comma separated reference table with three valid rows
pub fn create_test_reference_file(dir: &Path, filename: &str) -> std::io::Result<PathBuf> {
    let file_path = dir.join(filename);

    let content = r#"codeCI,codeCH,libelleCI,XLambert93,YLambert93
"597120","BA","Site A","600000.0","6700000.0"
142091,AO,Langres,848750.12,6760430.5
393314,BV,Château de Rambouillet,614123.0,6836420.0
"#;

    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Write a semicolon separated table with decimal commas and reordered columns
pub fn create_test_semicolon_file(dir: &Path, filename: &str) -> std::io::Result<PathBuf> {
    let file_path = dir.join(filename);

    let content = "libelleCI;YLambert93;codeCH;XLambert93;codeCI;ligne\n\
                   Gare de Sète;6252510,5;ST;744123,25;726158;810000\n\
                   Monument;6700000,0;FP;600000,0;583005;420000\n";

    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Assert that two records carry the same identifiers, label and position
pub fn assert_records_equal(actual: &ReferenceRecord, expected: &ReferenceRecord) {
    assert_eq!(actual.primary, expected.primary);
    assert_eq!(actual.secondary, expected.secondary);
    assert_eq!(actual.label, expected.label);
    assert_eq!(actual.x, expected.x);
    assert_eq!(actual.y, expected.y);
}
