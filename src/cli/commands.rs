//! Command implementations for the JBW Viewer CLI
//!
//! Sets up logging, loads configuration and the reference table, then hands
//! request lines to the pipeline and reports the outcome.

use crate::app::services::projection::project;
use crate::app::services::request_parser::read_request_file;
use crate::app::services::text_input::decode_text;
use crate::cli::args::{Args, Commands, OverviewArgs, RenderArgs, SearchArgs};
use crate::config::ViewerConfig;
use crate::error::PipelineError;
use crate::models::{OverviewResult, ReferenceRecord, RunResult};
use crate::pipeline::Pipeline;
use anyhow::{Context, Result, bail};
use colored::*;
use serde::Serialize;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Run the selected subcommand
pub fn run(args: Args) -> Result<()> {
    setup_logging(&args)?;
    debug!("Command line arguments: {:?}", args);

    let config = load_configuration(&args)?;

    match &args.command {
        Some(Commands::Render(render)) => run_render(&args, render, config),
        Some(Commands::Overview(overview)) => run_overview(&args, overview, config),
        Some(Commands::Search(search)) => run_search(&args, search, config),
        None => bail!("no command given, see --help"),
    }
}

/// Set up logging based on verbosity flags
fn setup_logging(args: &Args) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("jbw_viewer={}", log_level)));

    let registry = tracing_subscriber::registry().with(filter);

    let init = if args.quiet {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    init.context("Failed to initialize logging")
}

/// Defaults, then the optional JSON file
fn load_configuration(args: &Args) -> Result<ViewerConfig> {
    let config = match &args.config_file {
        Some(path) => ViewerConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ViewerConfig::default(),
    };
    debug!("Loaded configuration: {:?}", config);
    Ok(config)
}

fn load_pipeline(args: &Args, config: ViewerConfig) -> Result<Pipeline> {
    let (pipeline, stats) = Pipeline::load(&args.reference_path, config).with_context(|| {
        format!(
            "Failed to load reference table {}",
            args.reference_path.display()
        )
    })?;

    info!("{}", stats.summary());
    if stats.has_errors() {
        warn!(
            "{} reference row(s) rejected ({:.1}%)",
            stats.rows_skipped + stats.duplicates,
            stats.rejection_rate()
        );
    }
    Ok(pipeline)
}

fn run_render(args: &Args, render: &RenderArgs, mut config: ViewerConfig) -> Result<()> {
    if let Some(limit) = render.max_markers {
        config.max_markers = Some(limit);
    }
    if let Some(title) = &render.title {
        config.map.title = title.clone();
    }

    let mut pipeline = load_pipeline(args, config)?;

    let batches = if render.files.is_empty() {
        let lines = read_stdin_lines().context("Failed to read requests from stdin")?;
        vec![RequestBatch::from_lines("stdin", lines, render.base_output_path())]
    } else {
        render
            .files
            .iter()
            .zip(render.output_paths())
            .map(|(file, output_path)| RequestBatch::from_file(file, output_path))
            .collect()
    };

    let outcomes = render_batches(&mut pipeline, batches);
    report_batches(&outcomes, render.json, args.quiet)
}

/// Request lines from one source and where their map goes
#[derive(Debug)]
pub struct RequestBatch {
    pub source: String,
    pub lines: io::Result<Vec<String>>,
    pub output_path: PathBuf,
}

impl RequestBatch {
    pub fn from_file(path: &Path, output_path: PathBuf) -> Self {
        Self {
            source: path.display().to_string(),
            lines: read_request_file(path),
            output_path,
        }
    }

    pub fn from_lines(source: &str, lines: Vec<String>, output_path: PathBuf) -> Self {
        Self {
            source: source.to_string(),
            lines: Ok(lines),
            output_path,
        }
    }
}

/// Result of rendering one batch
#[derive(Debug)]
pub struct BatchOutcome {
    pub source: String,
    pub output_path: PathBuf,
    pub result: crate::Result<RunResult>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Run result to show the user, including the failures of a run that drew nothing
    pub fn report(&self) -> Option<RunResult> {
        match &self.result {
            Ok(result) => Some(result.clone()),
            Err(PipelineError::NoPoints { failures }) => Some(RunResult {
                failures: failures.clone(),
                ..Default::default()
            }),
            Err(_) => None,
        }
    }
}

/// Run every batch through the pipeline; a failed batch never stops the others
pub fn render_batches(pipeline: &mut Pipeline, batches: Vec<RequestBatch>) -> Vec<BatchOutcome> {
    batches
        .into_iter()
        .map(|batch| {
            let start_time = Instant::now();
            let result = match batch.lines {
                Ok(lines) => pipeline.run(&lines, &batch.output_path),
                Err(e) => Err(PipelineError::Io(e)),
            };
            debug!("{} processed in {:?}", batch.source, start_time.elapsed());

            BatchOutcome {
                source: batch.source,
                output_path: batch.output_path,
                result,
            }
        })
        .collect()
}

/// Print every outcome; fails when any batch produced no map
pub fn report_batches(outcomes: &[BatchOutcome], json: bool, quiet: bool) -> Result<()> {
    let mut failed_batches = 0;

    for outcome in outcomes {
        if let Some(result) = outcome.report() {
            if json {
                print_json(&result)?;
            } else if !quiet {
                print_summary(&outcome.source, &result);
            }
        }

        match &outcome.result {
            Ok(_) => {}
            Err(PipelineError::NoPoints { .. }) => {
                error!("{}: no reference point could be resolved", outcome.source);
                failed_batches += 1;
            }
            Err(e) => {
                error!("Run failed for {}: {}", outcome.source, e);
                failed_batches += 1;
            }
        }
    }

    if failed_batches > 0 {
        bail!(
            "{} of {} request batch(es) produced no map",
            failed_batches,
            outcomes.len()
        );
    }
    Ok(())
}

fn read_stdin_lines() -> io::Result<Vec<String>> {
    let mut bytes = Vec::new();
    io::stdin().read_to_end(&mut bytes)?;
    Ok(decode_text(&bytes).lines().map(str::to_string).collect())
}

fn run_overview(args: &Args, overview: &OverviewArgs, mut config: ViewerConfig) -> Result<()> {
    if let Some(title) = &overview.title {
        config.map.title = title.clone();
    }

    let pipeline = load_pipeline(args, config)?;
    let output_path = overview.output_path();
    let result = pipeline
        .overview(&output_path, overview.max_markers)
        .with_context(|| format!("Failed to write overview map {}", output_path.display()))?;

    if overview.json {
        return print_json(&result);
    }
    if !args.quiet {
        print_overview_summary(&result);
    }
    Ok(())
}

fn print_overview_summary(result: &OverviewResult) {
    println!("\n{}", "Overview map".bright_green().bold());
    println!(
        "  {} {} / {}",
        "Points drawn:".bright_cyan(),
        result.drawn.to_string().bright_white().bold(),
        result.total_records
    );
    if result.omitted > 0 {
        println!(
            "  {} {} (raise --max-markers)",
            "Over the limit:".yellow(),
            result.omitted.to_string().yellow().bold()
        );
    }
    if !result.invalid.is_empty() {
        println!(
            "  {} {}",
            "Invalid coordinates:".bright_red(),
            result.invalid.join(", ").bright_red()
        );
    }
    println!(
        "  {} {}",
        "Map written to:".bright_cyan(),
        result.output_path.display().to_string().bright_white()
    );
}

fn print_summary(source: &str, result: &RunResult) {
    println!(
        "\n{} {}",
        "Map summary for".bright_green().bold(),
        source.bright_white()
    );
    println!(
        "  {} {}",
        "Points drawn:".bright_cyan(),
        result.success_count().to_string().bright_white().bold()
    );
    if result.has_failures() {
        println!(
            "  {} {}",
            "Lines rejected:".bright_red(),
            result.failure_count().to_string().bright_red().bold()
        );
        for failure in &result.failures {
            println!(
                "    {} {} {}",
                format!("line {}:", failure.line_number).bright_red(),
                failure.raw_line,
                format!("({})", failure.reason.code()).dimmed()
            );
        }
    }
    match &result.output_path {
        Some(path) => println!(
            "  {} {}",
            "Map written to:".bright_cyan(),
            path.display().to_string().bright_white()
        ),
        None => println!("  {}", "No map written".bright_red()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to encode JSON output")?;
    println!("{}", text);
    Ok(())
}

/// One search hit with its WGS84 position
#[derive(Debug, Serialize)]
struct SearchHit<'a> {
    #[serde(flatten)]
    record: &'a ReferenceRecord,
    longitude: Option<f64>,
    latitude: Option<f64>,
}

impl<'a> From<&'a ReferenceRecord> for SearchHit<'a> {
    fn from(record: &'a ReferenceRecord) -> Self {
        let position = project(record.x, record.y)
            .ok()
            .filter(|p| p.is_within_bounds());
        Self {
            record,
            longitude: position.map(|p| p.longitude),
            latitude: position.map(|p| p.latitude),
        }
    }
}

fn run_search(args: &Args, search: &SearchArgs, config: ViewerConfig) -> Result<()> {
    let pipeline = load_pipeline(args, config)?;
    let index = pipeline.index();

    let matches = match &search.label {
        Some(pattern) => index.find_by_label(pattern),
        None => index.search(search.primary.as_deref(), search.secondary.as_deref()),
    };
    let total = matches.len();
    let hits: Vec<SearchHit<'_>> = matches
        .into_iter()
        .take(search.limit)
        .map(SearchHit::from)
        .collect();

    if search.json {
        return print_json(&hits);
    }

    println!(
        "\n{} {}",
        total.to_string().bright_white().bold(),
        "matching reference point(s)".bright_green().bold()
    );
    for hit in &hits {
        let position = match (hit.longitude, hit.latitude) {
            (Some(lon), Some(lat)) => format!("{:.6}, {:.6}", lon, lat),
            _ => "invalid coordinates".bright_red().to_string(),
        };
        println!(
            "  {} {} {}",
            format!("{}-{}", hit.record.primary, hit.record.secondary).bright_cyan(),
            hit.record.label,
            format!("({})", position).dimmed()
        );
    }
    if total > hits.len() {
        println!("  {} more not shown (use --limit)", total - hits.len());
    }

    Ok(())
}

/// Used by the binary when no subcommand is given
pub fn print_overview(path: &Path) {
    println!(
        "{}",
        "JBW Viewer - railway reference points on a map"
            .bright_green()
            .bold()
    );
    println!();
    println!("USAGE:");
    println!("    jbw-viewer <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    render      Resolve CI-CH codes and write an HTML map");
    println!("    overview    Draw every reference point on one map");
    println!("    search      Look up reference points by code or label");
    println!();
    println!("EXAMPLES:");
    println!("    jbw-viewer render exemple_pr.txt -o output/tournee.html");
    println!("    cat codes.txt | jbw-viewer render --json");
    println!("    jbw-viewer overview --max-markers 500");
    println!("    jbw-viewer search --primary 597120");
    println!();
    println!("Reference table: {}", path.display());
    println!("For detailed help on any command, use:");
    println!("    jbw-viewer <COMMAND> --help");
}
