//! Reference table row parsing
//!
//! This module maps header names to column positions and turns CSV rows into
//! validated `ReferenceRecord`s. Exports from spreadsheet tools often carry
//! stray quotes, padding and decimal commas; all are tolerated here.

use crate::config::IndexConfig;
use crate::models::ReferenceRecord;
use csv::StringRecord;
use thiserror::Error;

/// Why a single data row was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RowError {
    #[error("missing value for column '{column}'")]
    MissingField { column: String },

    #[error("invalid coordinate '{value}' in column '{column}'")]
    InvalidCoordinate { column: String, value: String },

    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
}

/// Positions of the required columns in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    pub primary: usize,
    pub secondary: usize,
    pub label: usize,
    pub x: usize,
    pub y: usize,
    /// Number of header fields
    pub field_count: usize,
}

impl ColumnMapping {
    /// Locate required columns by header name (case-insensitive)
    ///
    /// Returns the names of the missing columns on failure.
    pub fn from_headers(
        headers: &StringRecord,
        config: &IndexConfig,
    ) -> std::result::Result<Self, Vec<String>> {
        let names: Vec<String> = headers
            .iter()
            .map(|h| clean_field(h).to_lowercase())
            .collect();

        let position = |wanted: &str| -> Option<usize> {
            let wanted = wanted.trim().to_lowercase();
            names.iter().position(|name| *name == wanted)
        };

        let [primary, secondary, label, x, y] = config.required_columns().map(position);

        match (primary, secondary, label, x, y) {
            (Some(primary), Some(secondary), Some(label), Some(x), Some(y)) => Ok(Self {
                primary,
                secondary,
                label,
                x,
                y,
                field_count: headers.len(),
            }),
            _ => Err(config
                .required_columns()
                .into_iter()
                .filter(|column| position(*column).is_none())
                .map(|column| column.to_string())
                .collect()),
        }
    }
}

/// Guess the field delimiter from the header line
///
/// French spreadsheet exports use `;` because `,` is the decimal separator.
pub fn sniff_delimiter(header_line: &str) -> u8 {
    let semicolons = header_line.matches(';').count();
    let commas = header_line.matches(',').count();
    let tabs = header_line.matches('\t').count();

    if tabs > semicolons && tabs > commas {
        b'\t'
    } else if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// Trim whitespace and surrounding quote characters
pub fn clean_field(value: &str) -> &str {
    value.trim().trim_matches('"').trim()
}

/// Parse a projected coordinate, accepting a decimal comma
pub fn parse_coordinate(value: &str) -> Option<f64> {
    let cleaned = clean_field(value).replace(',', ".");
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse one data row into a reference record
///
/// A row with more non-empty fields than the header is rejected: unquoted
/// decimal commas in a comma separated table shift every later column.
pub fn parse_reference_record(
    record: &StringRecord,
    mapping: &ColumnMapping,
    config: &IndexConfig,
) -> std::result::Result<ReferenceRecord, RowError> {
    let mut overflow = record.iter().skip(mapping.field_count);
    if overflow.any(|field| !clean_field(field).is_empty()) {
        return Err(RowError::FieldCount {
            expected: mapping.field_count,
            found: record.len(),
        });
    }

    let required = |position: usize, column: &str| -> std::result::Result<String, RowError> {
        record
            .get(position)
            .map(clean_field)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .ok_or_else(|| RowError::MissingField {
                column: column.to_string(),
            })
    };

    let coordinate = |position: usize, column: &str| -> std::result::Result<f64, RowError> {
        let raw = required(position, column)?;
        parse_coordinate(&raw).ok_or_else(|| RowError::InvalidCoordinate {
            column: column.to_string(),
            value: raw,
        })
    };

    Ok(ReferenceRecord {
        primary: required(mapping.primary, &config.primary_column)?,
        secondary: required(mapping.secondary, &config.secondary_column)?,
        label: required(mapping.label, &config.label_column)?,
        x: coordinate(mapping.x, &config.x_column)?,
        y: coordinate(mapping.y, &config.y_column)?,
    })
}
