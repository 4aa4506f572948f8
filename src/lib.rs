//! JBW Viewer Library
//!
//! Resolves railway reference points (PR, identified by a CI/CH code pair)
//! against a Lambert-93 reference table and renders them on an interactive
//! OpenStreetMap/Leaflet map.
//!
//! This library provides tools for:
//! - Loading and indexing the reference table with header-driven columns
//! - Parsing request lines (`CI-CH` or `CI-CH;description`)
//! - Resolving requests with per-line failure accounting
//! - Converting Lambert-93 coordinates to WGS84
//! - Writing a self-contained HTML map atomically

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod pipeline;

// Core application modules
pub mod app {
    pub mod services {
        pub mod map_assembler;
        pub mod projection;
        pub mod reference_index;
        pub mod request_parser;
        pub mod resolver;
        pub mod text_input;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::services::reference_index::ReferenceIndex;
pub use config::ViewerConfig;
pub use error::{PipelineError, Result};
pub use models::{
    Failure, FailureReason, OverviewResult, PointRequest, ResolvedPoint, RunResult,
};
pub use pipeline::{Pipeline, RunStage, run_pipeline};
