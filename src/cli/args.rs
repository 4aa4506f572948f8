//! Command-line argument definitions for JBW Viewer
//!
//! This module defines the CLI interface using the clap derive API. The CLI
//! is a thin shell: it gathers request lines and an output path, calls the
//! pipeline and prints the run result.

use crate::constants::{
    DEFAULT_MAP_FILENAME, DEFAULT_OUTPUT_DIR, DEFAULT_OVERVIEW_FILENAME,
    DEFAULT_OVERVIEW_MAX_MARKERS, DEFAULT_REFERENCE_PATH,
};
use clap::{Parser, Subcommand};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// CLI arguments for the reference point viewer
#[derive(Debug, Clone, Parser)]
#[command(
    name = "jbw-viewer",
    version,
    about = "Show railway reference points (PR) on an interactive OpenStreetMap map",
    long_about = "Resolves PR codes written as CI-CH (optionally followed by ;description) \
                  against the Lambert-93 reference table and writes a Leaflet map \
                  with one marker per resolved point."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Reference table (CSV with codeCI, codeCH, libelleCI, XLambert93, YLambert93)
    #[arg(
        short = 'r',
        long = "reference",
        value_name = "PATH",
        global = true,
        default_value = DEFAULT_REFERENCE_PATH
    )]
    pub reference_path: PathBuf,

    /// JSON configuration file overriding defaults
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config_file: Option<PathBuf>,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Suppress output except errors"
    )]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Resolve PR codes and generate a map
    Render(RenderArgs),
    /// Draw every reference point on one map
    Overview(OverviewArgs),
    /// Look up reference points by code or label
    Search(SearchArgs),
}

/// Arguments for the render command
#[derive(Debug, Clone, Parser)]
pub struct RenderArgs {
    /// Request files (.txt or .csv), one CI-CH code per line. Reads stdin when omitted.
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,

    /// Output HTML file
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output_path: Option<PathBuf>,

    /// Maximum number of markers per map
    #[arg(long = "max-markers", value_name = "N")]
    pub max_markers: Option<usize>,

    /// Map title shown in the legend
    #[arg(long = "title")]
    pub title: Option<String>,

    /// Print the run result as JSON instead of a summary
    #[arg(long = "json")]
    pub json: bool,
}

/// Arguments for the overview command
#[derive(Debug, Clone, Parser)]
pub struct OverviewArgs {
    /// Output HTML file
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output_path: Option<PathBuf>,

    /// Maximum number of markers drawn
    #[arg(long = "max-markers", value_name = "N", default_value_t = DEFAULT_OVERVIEW_MAX_MARKERS)]
    pub max_markers: usize,

    /// Map title shown in the legend
    #[arg(long = "title")]
    pub title: Option<String>,

    /// Print the result as JSON instead of a summary
    #[arg(long = "json")]
    pub json: bool,
}

impl OverviewArgs {
    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| Path::new(DEFAULT_OUTPUT_DIR).join(DEFAULT_OVERVIEW_FILENAME))
    }
}

/// Arguments for the search command
#[derive(Debug, Clone, Parser)]
pub struct SearchArgs {
    /// CI code to match exactly
    #[arg(long = "primary", alias = "ci", value_name = "CODE")]
    pub primary: Option<String>,

    /// CH code to match exactly
    #[arg(long = "secondary", alias = "ch", value_name = "CODE")]
    pub secondary: Option<String>,

    /// Substring of the label (case-insensitive)
    #[arg(
        long = "label",
        value_name = "TEXT",
        conflicts_with_all = ["primary", "secondary"]
    )]
    pub label: Option<String>,

    /// Maximum number of results to print
    #[arg(long = "limit", default_value_t = 50)]
    pub limit: usize,

    /// Print matches as JSON
    #[arg(long = "json")]
    pub json: bool,
}

impl Args {
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}

impl RenderArgs {
    /// Map path used when rendering a single batch
    pub fn base_output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| Path::new(DEFAULT_OUTPUT_DIR).join(DEFAULT_MAP_FILENAME))
    }

    /// Map path for a request file; suffixed with the file stem when several files are rendered
    pub fn output_path_for(&self, request_file: &Path) -> PathBuf {
        let base = self.base_output_path();
        if self.files.len() <= 1 {
            return base;
        }

        let base_stem = base
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "map".to_string());
        let file_stem = request_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "requests".to_string());

        base.with_file_name(format!("{}_{}.html", base_stem, file_stem))
    }

    /// Map path for every request file, in order
    ///
    /// Files sharing a stem get `_2`, `_3`, ... so no map overwrites another.
    pub fn output_paths(&self) -> Vec<PathBuf> {
        let mut used = HashSet::new();

        self.files
            .iter()
            .map(|file| {
                let candidate = self.output_path_for(file);
                let mut path = candidate.clone();
                let mut n = 1;
                while !used.insert(path.clone()) {
                    n += 1;
                    let stem = candidate
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    path = candidate.with_file_name(format!("{}_{}.html", stem, n));
                }
                path
            })
            .collect()
    }
}
