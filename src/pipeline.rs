//! Pipeline orchestration for one process.
//!
//! Loads the reference index once, then runs parse → resolve → render for
//! each batch of request lines handed over by a shell (CLI, GUI, tests).
//! Per-line problems are accumulated in the `RunResult`; only a missing
//! index, an empty resolution or a failed write ends a run early.

use crate::app::services::map_assembler::MapAssembler;
use crate::app::services::reference_index::{LoadStats, ReferenceIndex};
use crate::app::services::request_parser::{parse_lines, partition};
use crate::app::services::resolver::Resolver;
use crate::config::ViewerConfig;
use crate::error::{PipelineError, Result};
use crate::models::{Failure, FailureReason, OverviewResult, RunResult};
use std::fmt;
use std::path::Path;
use tracing::{debug, info, warn};

/// Stages of a single run, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Idle,
    IndexLoaded,
    Parsed,
    Resolved,
    Rendered,
    Failed,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStage::Idle => "idle",
            RunStage::IndexLoaded => "index-loaded",
            RunStage::Parsed => "parsed",
            RunStage::Resolved => "resolved",
            RunStage::Rendered => "rendered",
            RunStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Resolution-and-rendering pipeline bound to one reference index
#[derive(Debug)]
pub struct Pipeline {
    index: ReferenceIndex,
    config: ViewerConfig,
    assembler: MapAssembler,
    stage: RunStage,
    runs: usize,
}

impl Pipeline {
    /// Create a pipeline over an already loaded index
    pub fn new(index: ReferenceIndex) -> Self {
        let config = ViewerConfig::default();
        Self {
            assembler: MapAssembler::new(config.map.clone()),
            index,
            config,
            stage: RunStage::IndexLoaded,
            runs: 0,
        }
    }

    /// Load the reference table and create a pipeline over it
    pub fn load(index_path: &Path, config: ViewerConfig) -> Result<(Self, LoadStats)> {
        config.validate()?;
        let (index, stats) = ReferenceIndex::load(index_path, &config.index)?;
        Ok((Self::new(index).with_config(config), stats))
    }

    /// Configure the pipeline
    pub fn with_config(mut self, config: ViewerConfig) -> Self {
        self.assembler = MapAssembler::new(config.map.clone());
        self.config = config;
        self
    }

    pub fn index(&self) -> &ReferenceIndex {
        &self.index
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    /// Stage reached by the most recent run
    pub fn stage(&self) -> RunStage {
        self.stage
    }

    /// Number of runs started on this pipeline
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Run parse → resolve → render for one batch of request lines
    ///
    /// # Errors
    /// * `PipelineError::NoPoints` when no line resolved; carries every failure
    /// * `PipelineError::Render` when the map cannot be written
    pub fn run<I, S>(&mut self, lines: I, output_path: &Path) -> Result<RunResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.runs += 1;
        self.stage = RunStage::IndexLoaded;
        info!(
            "Run {} against {} reference points",
            self.runs,
            self.index.len()
        );

        let result = self.run_stages(lines, output_path);
        if result.is_err() {
            self.transition(RunStage::Failed);
        }
        result
    }

    fn run_stages<I, S>(&mut self, lines: I, output_path: &Path) -> Result<RunResult>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let (requests, mut failures) = partition(parse_lines(lines));
        self.transition(RunStage::Parsed);
        debug!(
            "{} request(s), {} malformed line(s)",
            requests.len(),
            failures.len()
        );

        let resolution = Resolver::new(&self.index).resolve(&requests);
        failures.extend(resolution.failures);
        let mut points = resolution.points;

        if let Some(limit) = self.config.max_markers {
            if points.len() > limit {
                warn!(
                    "Limiting map to {} markers, {} resolved point(s) dropped",
                    limit,
                    points.len() - limit
                );
                for point in points.split_off(limit) {
                    let raw_line = requests
                        .iter()
                        .find(|r| r.line_number == point.line_number)
                        .map(|r| r.raw_line.clone())
                        .unwrap_or_else(|| point.request_code());
                    failures.push(Failure::new(
                        point.line_number,
                        raw_line,
                        FailureReason::MarkerLimit,
                    ));
                }
            }
        }

        // Report failures in input order regardless of the stage that produced them
        failures.sort_by_key(|f| f.line_number);
        self.transition(RunStage::Resolved);

        for failure in &failures {
            warn!("Request rejected: {}", failure);
        }

        if points.is_empty() {
            return Err(PipelineError::NoPoints { failures });
        }

        let output_path = self.assembler.assemble(&points, output_path)?;
        self.transition(RunStage::Rendered);

        let result = RunResult {
            points,
            failures,
            output_path: Some(output_path),
        };
        info!("{}", result.summary());
        Ok(result)
    }

    /// Draw every reference point on one map, capped at `limit` markers
    ///
    /// Records are taken in identifier order; the ones past the cap are
    /// counted, not drawn. Records whose coordinates do not project are
    /// listed in the result.
    ///
    /// # Errors
    /// * `PipelineError::Configuration` when `limit` is 0
    /// * `PipelineError::NoPoints` when no record projects
    /// * `PipelineError::Render` when the map cannot be written
    pub fn overview(&self, output_path: &Path, limit: usize) -> Result<OverviewResult> {
        if limit == 0 {
            return Err(PipelineError::configuration(
                "overview marker limit must be at least 1",
            ));
        }

        let resolver = Resolver::new(&self.index);
        let records = self.index.records();
        let total_records = records.len();

        let mut points = Vec::with_capacity(total_records.min(limit));
        let mut invalid = Vec::new();
        for (position, record) in records.into_iter().enumerate() {
            match resolver.resolve_record(record, None, position + 1) {
                Some(point) => points.push(point),
                None => invalid.push(record.key().to_string()),
            }
        }

        let omitted = points.len().saturating_sub(limit);
        if omitted > 0 {
            info!(
                "Limiting overview to {} markers out of {} drawable reference points",
                limit,
                points.len()
            );
            points.truncate(limit);
        }

        if points.is_empty() {
            return Err(PipelineError::NoPoints {
                failures: Vec::new(),
            });
        }

        let assembler = MapAssembler::new(self.config.map.clone().for_overview());
        let output_path = assembler.assemble(&points, output_path)?;

        let result = OverviewResult {
            total_records,
            drawn: points.len(),
            omitted,
            invalid,
            output_path,
        };
        info!("{}", result.summary());
        Ok(result)
    }

    fn transition(&mut self, stage: RunStage) {
        debug!("Pipeline stage: {} -> {}", self.stage, stage);
        self.stage = stage;
    }
}

/// Load `index_path`, then run the pipeline once
///
/// Shells that run several batches should build a [`Pipeline`] instead so
/// the reference table is read only once.
pub fn run_pipeline<I, S>(index_path: &Path, lines: I, output_path: &Path) -> Result<RunResult>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let (mut pipeline, _stats) = Pipeline::load(index_path, ViewerConfig::default())?;
    pipeline.run(lines, output_path)
}
