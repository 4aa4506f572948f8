//! Reference index loading
//!
//! This module reads the reference table from disk, maps its columns by
//! header name and fills the index. Bad rows are skipped and counted; only a
//! missing, unreadable or entirely invalid table is fatal.

use super::ReferenceIndex;
use super::metadata::LoadStats;
use super::parser::{ColumnMapping, parse_reference_record, sniff_delimiter};
use crate::app::services::text_input::read_text_file;
use crate::config::IndexConfig;
use crate::error::{PipelineError, Result};
use csv::{ReaderBuilder, Trim};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

impl ReferenceIndex {
    /// Load the reference table at `path`
    ///
    /// # Arguments
    /// * `path` - Delimited text file with a header row
    /// * `config` - Column names and optional delimiter override
    ///
    /// # Returns
    /// * `Result<(ReferenceIndex, LoadStats)>` - Index and loading statistics
    ///
    /// # Errors
    /// * Returns `PipelineError::DataSource` if the file does not exist, cannot
    ///   be read, lacks a required column or holds no valid row
    pub fn load(path: &Path, config: &IndexConfig) -> Result<(Self, LoadStats)> {
        info!("Loading reference table: {}", path.display());

        let start_time = Instant::now();

        if !path.exists() {
            return Err(PipelineError::data_source(path, "file does not exist"));
        }

        let text = read_text_file(path)
            .map_err(|e| PipelineError::data_source(path, format!("unreadable: {}", e)))?;

        let (index, stats) = Self::load_from_str(&text, path, config, start_time)?;

        info!("{}", stats.summary());
        Ok((index, stats))
    }

    /// Build the index from already decoded table text
    pub(crate) fn load_from_str(
        text: &str,
        path: &Path,
        config: &IndexConfig,
        start_time: Instant,
    ) -> Result<(Self, LoadStats)> {
        let header_line = text
            .lines()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| PipelineError::data_source(path, "file is empty"))?;

        let delimiter = config
            .delimiter
            .unwrap_or_else(|| sniff_delimiter(header_line));
        debug!(
            "Reading {} with delimiter {:?}",
            path.display(),
            delimiter as char
        );

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(text.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| PipelineError::data_source(path, format!("invalid header row: {}", e)))?
            .clone();

        let mapping = ColumnMapping::from_headers(&headers, config).map_err(|missing| {
            PipelineError::data_source(
                path,
                format!("missing required column(s): {}", missing.join(", ")),
            )
        })?;

        let mut index = Self::new(path.to_path_buf());
        let mut stats = LoadStats::new();

        for (row, result) in reader.records().enumerate() {
            // Header is row 1
            let row_number = row + 2;
            stats.rows_read += 1;

            let record = match result {
                Ok(record) => record,
                Err(e) => {
                    warn!("Unreadable row {} in {}: {}", row_number, path.display(), e);
                    stats.rows_skipped += 1;
                    stats.errors.push(format!("row {}: {}", row_number, e));
                    continue;
                }
            };

            match parse_reference_record(&record, &mapping, config) {
                Ok(reference) => {
                    let key = reference.key();
                    if index.insert(reference) {
                        stats.records_loaded += 1;
                    } else {
                        warn!(
                            "Duplicate reference point {} at row {}, keeping first occurrence",
                            key, row_number
                        );
                        stats.duplicates += 1;
                    }
                }
                Err(e) => {
                    warn!("Skipping row {} in {}: {}", row_number, path.display(), e);
                    stats.rows_skipped += 1;
                    stats.errors.push(format!("row {}: {}", row_number, e));
                }
            }
        }

        stats.load_duration = start_time.elapsed();

        if index.is_empty() {
            return Err(PipelineError::data_source(
                path,
                format!("no valid rows ({} rows read)", stats.rows_read),
            ));
        }

        index.load_time = Instant::now();
        Ok((index, stats))
    }
}
