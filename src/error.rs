//! Error handling for reference point resolution and map rendering.
//!
//! Fatal conditions (missing reference table, nothing to draw, failed
//! writes) are `PipelineError`s. Per-line problems are not errors here;
//! they are collected as [`Failure`](crate::models::Failure) entries.

use crate::app::services::map_assembler::RenderError;
use crate::models::Failure;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Reference table unusable: {path} - {reason}")]
    DataSource { path: PathBuf, reason: String },

    #[error("No reference point could be resolved ({} failure(s))", failures.len())]
    NoPoints { failures: Vec<Failure> },

    #[error("Map rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl PipelineError {
    /// Create a data source error for the given reference table
    pub fn data_source(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::DataSource {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Per-line failures attached to this error, if any
    pub fn failures(&self) -> &[Failure] {
        match self {
            Self::NoPoints { failures } => failures,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
