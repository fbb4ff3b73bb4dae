//! scrollspy CLI
//!
//! Replays scripted input scenarios against the scroll engine and manages
//! engine configuration files.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Scroll-driven UI state engine diagnostics
#[derive(Parser, Debug)]
#[command(name = "scrollspy")]
#[command(about = "Replay input scenarios against the scrollspy engine")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a JSON scenario and print its report
    Replay {
        /// Scenario file
        scenario: PathBuf,

        /// Engine configuration (overrides the scenario's own)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Also write the report to this file
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// Virtual clock granularity for wait steps
        #[arg(long, default_value = "16")]
        tick_ms: u64,
    },

    /// Parse and validate a configuration file
    CheckConfig {
        /// Configuration file
        path: PathBuf,
    },

    /// Write the default configuration
    InitConfig {
        /// Output file
        #[arg(default_value = "scrollspy.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Replay {
            scenario,
            config,
            report,
            tick_ms,
        } => {
            let passed = commands::replay(&scenario, config.as_deref(), report.as_deref(), tick_ms)?;
            if !passed {
                std::process::exit(1);
            }
        }
        Commands::CheckConfig { path } => commands::check_config(&path)?,
        Commands::InitConfig { path, force } => commands::init_config(&path, force)?,
    }

    Ok(())
}
