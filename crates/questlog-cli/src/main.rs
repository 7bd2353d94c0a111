#![forbid(unsafe_code)]

mod cmd;
mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use output::{CliError, OutputMode};
use questlog_core::config::{QuestlogConfig, load_config, load_config_file};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "questlog: quest list reconciliation engine",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Config file (default: .questlog/config.toml, then the user config).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self, config: &QuestlogConfig) -> OutputMode {
        output::resolve_output_mode(self.format, self.json, config.output.as_deref())
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Replay a captured event stream",
        long_about = "Feed a JSON-lines file of quest events through a fresh tracker and report the final views.",
        after_help = "EXAMPLES:\n    # Replay a capture\n    questlog replay session.jsonl\n\n    # Show the views after every event\n    questlog replay session.jsonl --step\n\n    # Emit machine-readable output\n    questlog replay session.jsonl --json"
    )]
    Replay(cmd::replay::ReplayArgs),

    #[command(
        about = "Decode one quest list response",
        long_about = "Decode a single quest list response body and list its quests and discarded items.",
        after_help = "EXAMPLES:\n    # Inspect an unscoped page\n    questlog inspect questlist.txt\n\n    # Inspect a page of the active tab\n    questlog inspect questlist.txt --tab 9\n\n    # Read from stdin\n    cat questlist.txt | questlog inspect -"
    )]
    Inspect(cmd::inspect::InspectArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("QUESTLOG_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "questlog=debug,info"
        } else {
            "questlog=info,warn"
        })
    });

    let format = env::var("QUESTLOG_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<QuestlogConfig> {
    let config = match explicit {
        Some(path) => load_config_file(path)?,
        None => {
            let root = env::current_dir().context("failed to resolve working directory")?;
            load_config(&root)?
        }
    };
    debug!(?config, "resolved config");
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let config = match resolve_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            let mode = output::resolve_output_mode(cli.format, cli.json, None);
            let cli_error = match err.downcast_ref::<questlog_core::config::ConfigError>() {
                Some(config_err) => CliError::with_code(config_err.to_string(), config_err.code()),
                None => CliError::new(format!("{err:#}")),
            };
            output::render_error(mode, &cli_error)?;
            return Err(err);
        }
    };
    let output = cli.output_mode(&config);

    match cli.command {
        Commands::Replay(ref args) => cmd::replay::run_replay(args, &config.engine, output),
        Commands::Inspect(ref args) => cmd::inspect::run_inspect(args, output),
    }
}
