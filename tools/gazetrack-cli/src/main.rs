//! Gazetrack CLI: record, inspect and convert gaze logs.
//!
//! Usage:
//!   gazetrack record [OPTIONS]     Record a gaze session
//!   gazetrack info <PATH>          Summarize a gaze log
//!   gazetrack convert <PATH>       Convert between binary and JSONL logs
//!   gazetrack check                Show configuration and probe timing

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gazetrack_common::config::AppConfig;

mod commands;

use commands::ExportFormat;

#[derive(Parser)]
#[command(
    name = "gazetrack",
    about = "Real-time gaze sampling, recording and analysis",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a gaze session
    Record {
        /// Gaze source: simulated | static
        #[arg(short, long, default_value = "simulated")]
        source: String,

        /// Session length; recording stops by itself after this (ms)
        #[arg(short, long, default_value = "5000")]
        duration_ms: u32,

        /// Recording sampling period (ms), overrides the config file
        #[arg(long)]
        period_ms: Option<u32>,

        /// Output file (defaults to the configured export directory)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "binary")]
        format: ExportFormat,
    },

    /// Summarize a recorded gaze log
    Info {
        /// Path to a binary or .jsonl gaze log
        path: PathBuf,
    },

    /// Convert a binary log to JSONL, or a .jsonl log to binary
    Convert {
        /// Input gaze log
        input: PathBuf,

        /// Output file (defaults to the input with the other extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show configuration and measure scheduler wake-up jitter
    Check {
        /// Number of 1 ms deadlines to probe
        #[arg(long, default_value = "500")]
        probe_ticks: u32,

        /// Write the effective configuration to the config file
        #[arg(long)]
        write_config: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load();

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    gazetrack_common::logging::init_logging(&logging)?;

    match cli.command {
        Commands::Record {
            source,
            duration_ms,
            period_ms,
            output,
            format,
        } => commands::record::run(config, source, duration_ms, period_ms, output, format).await,
        Commands::Info { path } => commands::info::run(path),
        Commands::Convert { input, output } => commands::convert::run(input, output),
        Commands::Check {
            probe_ticks,
            write_config,
        } => commands::check::run(config, probe_ticks, write_config),
    }
}
