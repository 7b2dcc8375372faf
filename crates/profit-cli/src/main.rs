//! Command-line runner for the puzzle engine.
//!
//! # Usage
//!
//! ```bash
//! # Simulate a document read from stdin
//! profit run < task.json
//!
//! # Simulate a file without the per-turn log
//! profit run --input task.json --no-log --pretty
//!
//! # Strip a solved world down to its task
//! profit export --mode task --input solution.json
//!
//! # Time parse and simulate
//! profit bench --iterations 200 tasks/*.json
//! ```
//!
//! The output document goes to stdout. On failure an error document goes
//! to stderr and the exit status is 1. Diagnostics are written to stderr
//! through `tracing` and are silent unless `-v` or `RUST_LOG` asks for them.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use profit_core::document::{ExportMode, SimulationOutput};
use profit_core::error::{ErrorDocument, ErrorType};
use profit_core::world::World;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod bench;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "profit")]
#[command(about = "Validate, simulate and export resource-flow puzzle worlds")]
#[command(version)]
struct Cli {
    /// Enable debug logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// TOML file with defaults for the flags below
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a world and print the output document
    Run {
        /// World document; stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Leave the per-turn log empty
        #[arg(long)]
        no_log: bool,

        /// Indent the output document
        #[arg(long)]
        pretty: bool,
    },

    /// Re-emit a world as a flat document
    Export {
        /// World document; stdin when omitted
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// `complete` keeps every structure, `task` only deposits and obstacles
        #[arg(short, long, default_value = "complete")]
        mode: ExportMode,
    },

    /// Time parsing and simulation of one or more documents
    Bench {
        /// Rounds per file
        #[arg(short = 'n', long)]
        iterations: Option<usize>,

        /// World documents
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

/// Why a command did not produce its document.
#[derive(Debug)]
enum Failure {
    /// Reading or decoding the input failed.
    Io(anyhow::Error),
    /// The world was read but is not valid.
    Invalid(ErrorDocument),
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Failure::Io(err)
    }
}

#[derive(Serialize)]
struct IoRecord {
    #[serde(rename = "type")]
    kind: &'static str,
    message: String,
}

#[derive(Serialize)]
struct IoErrorDocument {
    errors: Vec<IoRecord>,
}

impl IoErrorDocument {
    fn new(err: &anyhow::Error) -> Self {
        Self {
            errors: vec![IoRecord {
                kind: "io",
                message: format!("{err:#}"),
            }],
        }
    }
}

fn emit_errors(doc: &impl Serialize) -> ExitCode {
    match serde_json::to_string(doc) {
        Ok(text) => eprintln!("{text}"),
        Err(err) => eprintln!("{err}"),
    }
    ExitCode::FAILURE
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read from standard input")?;
            Ok(text)
        }
    }
}

fn parse_world(text: &str) -> Result<World> {
    World::from_json(text).context("Failed to parse JSON")
}

/// Parse and simulate one document.
fn simulate_document(text: &str, log: bool) -> Result<SimulationOutput, Failure> {
    let mut world = parse_world(text)?;
    world.set_log_enabled(log);
    let outcome = world.simulate().map(|_| ());
    if let Err(err) = outcome {
        tracing::info!(%err, "world rejected");
        return Err(Failure::Invalid(world.error_document()));
    }
    tracing::info!(
        score = world.score(),
        score_at_turn = world.score_at_turn(),
        "simulation finished"
    );
    Ok(world.output())
}

/// Flatten one document. Worlds with input errors have nothing to export.
fn export_document(text: &str, mode: ExportMode) -> Result<serde_json::Value, Failure> {
    let world = parse_world(text)?;
    if world.errors().any(|e| e.kind() == ErrorType::Input) {
        return Err(Failure::Invalid(world.error_document()));
    }
    let raw = serde_json::to_value(world.to_raw(mode)).context("Failed to encode world")?;
    Ok(raw)
}

fn to_json(value: &impl Serialize, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    text.context("Failed to encode output")
}

fn cmd_run(input: Option<&Path>, log: bool, pretty: bool) -> Result<(), Failure> {
    let text = read_input(input)?;
    let output = simulate_document(&text, log)?;
    println!("{}", to_json(&output, pretty)?);
    Ok(())
}

fn cmd_export(input: Option<&Path>, mode: ExportMode) -> Result<(), Failure> {
    let text = read_input(input)?;
    let raw = export_document(&text, mode)?;
    println!("{}", to_json(&raw, false)?);
    Ok(())
}

fn cmd_bench(files: Vec<PathBuf>, iterations: usize) -> Result<(), Failure> {
    let mut reports = Vec::with_capacity(files.len());
    for file in files {
        let text = read_input(Some(&file))?;
        let raw: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse JSON in {}", file.display()))?;
        reports.push(bench::run(file, &raw, iterations));
    }
    println!("{}", to_json(&reports, true)?);
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => return emit_errors(&IoErrorDocument::new(&err)),
    };
    tracing::debug!(?config, "configuration loaded");

    let result = match cli.command {
        Commands::Run {
            input,
            no_log,
            pretty,
        } => cmd_run(
            input.as_deref(),
            config.run.log && !no_log,
            config.run.pretty || pretty,
        ),
        Commands::Export { input, mode } => cmd_export(input.as_deref(), mode),
        Commands::Bench { iterations, files } => {
            cmd_bench(files, iterations.unwrap_or(config.bench.iterations))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(Failure::Io(err)) => emit_errors(&IoErrorDocument::new(&err)),
        Err(Failure::Invalid(doc)) => emit_errors(&doc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use profit_core::test_utils::{pipeline_document, showcase_document};

    #[test]
    fn cli_parses_run_flags() {
        let cli = Cli::try_parse_from(["profit", "-v", "run", "--input", "a.json", "--no-log"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Run { input, no_log, pretty } => {
                assert_eq!(input, Some(PathBuf::from("a.json")));
                assert!(no_log);
                assert!(!pretty);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn cli_parses_export_mode() {
        let cli = Cli::try_parse_from(["profit", "export", "--mode", "task"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Export {
                mode: ExportMode::Task,
                ..
            }
        ));
        assert!(Cli::try_parse_from(["profit", "export", "--mode", "partial"]).is_err());
    }

    #[test]
    fn bench_needs_files() {
        assert!(Cli::try_parse_from(["profit", "bench"]).is_err());
        let cli = Cli::try_parse_from(["profit", "bench", "-n", "5", "a.json", "b.json"]).unwrap();
        match cli.command {
            Commands::Bench { iterations, files } => {
                assert_eq!(iterations, Some(5));
                assert_eq!(files.len(), 2);
            }
            _ => panic!("expected bench"),
        }
    }

    #[test]
    fn simulates_showcase() {
        let output = simulate_document(&showcase_document().to_string(), true).unwrap();
        assert_eq!(output.score, 60);
        assert_eq!(output.score_at_turn, 18);
        assert_eq!(output.log.len(), 361);
    }

    #[test]
    fn no_log_keeps_the_result() {
        let output = simulate_document(&pipeline_document(5).to_string(), false).unwrap();
        assert_eq!(output.score, 6);
        assert!(output.log.is_empty());
    }

    #[test]
    fn invalid_world_gives_error_document() {
        let Err(Failure::Invalid(doc)) = simulate_document(&pipeline_document(0).to_string(), true)
        else {
            panic!("expected an invalid world");
        };
        assert_eq!(doc.errors.len(), 1);
        assert_eq!(doc.errors[0].message, "Number of turns < 1");
    }

    #[test]
    fn malformed_json_is_an_io_failure() {
        let Err(Failure::Io(err)) = simulate_document("{ width: ", true) else {
            panic!("expected an io failure");
        };
        let json = serde_json::to_value(IoErrorDocument::new(&err)).unwrap();
        assert_eq!(json["errors"][0]["type"], "io");
        assert!(
            json["errors"][0]["message"]
                .as_str()
                .is_some_and(|m| m.starts_with("Failed to parse JSON"))
        );
    }

    #[test]
    fn export_task_drops_machines() {
        let raw = export_document(&pipeline_document(5).to_string(), ExportMode::Task).unwrap();
        assert_eq!(raw["objects"].as_array().map(Vec::len), Some(1));
        assert_eq!(raw["objects"][0]["type"], "deposit");
    }

    #[test]
    fn export_refuses_input_errors() {
        let result = export_document(r#"{ "width": 0 }"#, ExportMode::Complete);
        assert!(matches!(result, Err(Failure::Invalid(_))));
    }
}
