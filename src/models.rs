//! Core data structures shared by the resolution pipeline.
//!
//! Defines reference records, parsed requests, resolved points,
//! per-line failures and the result of one pipeline run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Normalized composite identifier used as the reference index key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompositeKey {
    pub primary: String,
    pub secondary: String,
}

impl CompositeKey {
    /// Build a key, trimming and uppercasing both halves
    pub fn new(primary: &str, secondary: &str) -> Self {
        Self {
            primary: normalize_code(primary),
            secondary: normalize_code(secondary),
        }
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.primary, self.secondary)
    }
}

/// Case-fold an identifier half for comparison
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// One row of the reference table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub primary: String,
    pub secondary: String,
    pub label: String,
    /// Lambert-93 easting in metres
    pub x: f64,
    /// Lambert-93 northing in metres
    pub y: f64,
}

impl ReferenceRecord {
    pub fn key(&self) -> CompositeKey {
        CompositeKey::new(&self.primary, &self.secondary)
    }
}

/// One user-supplied request line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointRequest {
    pub primary: String,
    pub secondary: String,
    pub description: Option<String>,
    /// 1-based position in the submitted input
    pub line_number: usize,
    pub raw_line: String,
}

impl PointRequest {
    pub fn key(&self) -> CompositeKey {
        CompositeKey::new(&self.primary, &self.secondary)
    }
}

/// A request joined to its reference record, in WGS84
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPoint {
    pub primary: String,
    pub secondary: String,
    pub label: String,
    pub description: Option<String>,
    pub longitude: f64,
    pub latitude: f64,
    pub line_number: usize,
}

impl ResolvedPoint {
    /// Identifier as shown in map popups (`primary.secondary`)
    pub fn display_code(&self) -> String {
        format!("{}.{}", self.primary, self.secondary)
    }

    /// Identifier as typed by users (`primary-secondary`)
    pub fn request_code(&self) -> String {
        format!("{}-{}", self.primary, self.secondary)
    }
}

/// Why a request line did not produce a marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureReason {
    MalformedLine,
    UnknownIdentifier,
    InvalidCoordinates,
    MarkerLimit,
}

impl FailureReason {
    pub fn code(&self) -> &'static str {
        match self {
            FailureReason::MalformedLine => "malformed-line",
            FailureReason::UnknownIdentifier => "unknown-identifier",
            FailureReason::InvalidCoordinates => "invalid-coordinates",
            FailureReason::MarkerLimit => "marker-limit",
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A recoverable, per-line failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    pub line_number: usize,
    pub raw_line: String,
    pub reason: FailureReason,
}

impl Failure {
    pub fn new(line_number: usize, raw_line: impl Into<String>, reason: FailureReason) -> Self {
        Self {
            line_number,
            raw_line: raw_line.into(),
            reason,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: {} ({})",
            self.line_number, self.raw_line, self.reason
        )
    }
}

/// Output of the input parser for one line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Request(PointRequest),
    Failure(Failure),
}

/// Outcome of one pipeline run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunResult {
    pub points: Vec<ResolvedPoint>,
    pub failures: Vec<Failure>,
    /// Present only when a map was written
    pub output_path: Option<PathBuf>,
}

impl RunResult {
    pub fn success_count(&self) -> usize {
        self.points.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Number of failures with the given reason
    pub fn count_reason(&self, reason: FailureReason) -> usize {
        self.failures.iter().filter(|f| f.reason == reason).count()
    }

    /// One-line human readable summary
    pub fn summary(&self) -> String {
        let output = self
            .output_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "no map written".to_string());
        format!(
            "{} point(s) mapped, {} failure(s) -> {}",
            self.success_count(),
            self.failure_count(),
            output
        )
    }
}

/// Outcome of drawing the whole reference table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewResult {
    /// Records in the index
    pub total_records: usize,

    /// Markers written to the map
    pub drawn: usize,

    /// Drawable records left out by the marker cap
    pub omitted: usize,

    /// Identifiers (`primary-secondary`) whose coordinates do not project
    pub invalid: Vec<String>,

    pub output_path: PathBuf,
}

impl OverviewResult {
    pub fn summary(&self) -> String {
        format!(
            "{} of {} reference point(s) mapped ({} over the limit, {} invalid) -> {}",
            self.drawn,
            self.total_records,
            self.omitted,
            self.invalid.len(),
            self.output_path.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_key_normalization() {
        let key = CompositeKey::new(" 597120 ", "ba");
        assert_eq!(key.primary, "597120");
        assert_eq!(key.secondary, "BA");
        assert_eq!(key.to_string(), "597120-BA");
        assert_eq!(key, CompositeKey::new("597120", "BA"));
    }

    #[test]
    fn test_failure_reason_codes() {
        assert_eq!(FailureReason::MalformedLine.code(), "malformed-line");
        assert_eq!(FailureReason::UnknownIdentifier.to_string(), "unknown-identifier");
        assert_eq!(
            serde_json::to_string(&FailureReason::InvalidCoordinates).unwrap(),
            "\"invalid-coordinates\""
        );
    }

    #[test]
    fn test_run_result_counts() {
        let result = RunResult {
            points: vec![],
            failures: vec![
                Failure::new(1, "justtext", FailureReason::MalformedLine),
                Failure::new(2, "000000-ZZ", FailureReason::UnknownIdentifier),
                Failure::new(3, "x", FailureReason::MalformedLine),
            ],
            output_path: None,
        };

        assert_eq!(result.success_count(), 0);
        assert_eq!(result.failure_count(), 3);
        assert_eq!(result.count_reason(FailureReason::MalformedLine), 2);
        assert!(result.summary().contains("no map written"));
    }

    #[test]
    fn test_resolved_point_codes() {
        let point = ResolvedPoint {
            primary: "597120".to_string(),
            secondary: "BA".to_string(),
            label: "Site A".to_string(),
            description: None,
            longitude: 1.67,
            latitude: 47.39,
            line_number: 1,
        };
        assert_eq!(point.display_code(), "597120.BA");
        assert_eq!(point.request_code(), "597120-BA");
    }
}
