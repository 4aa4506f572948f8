//! Reference index loading statistics
//!
//! This module defines the counters collected while reading the
//! reference table.

/// Statistics about one reference table load
#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    /// Data rows read from the table (header excluded)
    pub rows_read: usize,

    /// Records inserted into the index
    pub records_loaded: usize,

    /// Rows skipped for missing fields or non-numeric coordinates
    pub rows_skipped: usize,

    /// Rows dropped because their composite key was already present
    pub duplicates: usize,

    /// Time taken to load the index
    pub load_duration: std::time::Duration,

    /// Per-row problems, as "row N: reason"
    pub errors: Vec<String>,
}

impl LoadStats {
    /// Create new empty load statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Percentage of data rows that did not make it into the index
    pub fn rejection_rate(&self) -> f64 {
        if self.rows_read == 0 {
            0.0
        } else {
            ((self.rows_skipped + self.duplicates) as f64 / self.rows_read as f64) * 100.0
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Get a summary string of the loading process
    pub fn summary(&self) -> String {
        format!(
            "Loaded {} reference points from {} rows ({} skipped, {} duplicates) in {:.2}s",
            self.records_loaded,
            self.rows_read,
            self.rows_skipped,
            self.duplicates,
            self.load_duration.as_secs_f64()
        )
    }
}
