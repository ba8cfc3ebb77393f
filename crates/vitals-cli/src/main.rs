//! vitals: replay recorded page loads through the performance tracker.
//!
//! # Usage
//!
//! ```text
//! vitals replay --scenario page.toml --config vitals.toml --format json
//! vitals thresholds
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod report;
mod scenario;

#[derive(Parser)]
#[command(
    name = "vitals",
    about = "Page performance tracking: metrics, alerts, and score",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded page scenario and report what the tracker saw.
    Replay {
        /// Scenario file (TOML).
        #[arg(short, long)]
        scenario: PathBuf,
        /// Tracker config (TOML). Defaults apply when omitted.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: String,
    },
    /// Print the default alert thresholds as TOML.
    Thresholds,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            scenario,
            config,
            format,
        } => commands::replay::replay(&scenario, config.as_deref(), &format).await,
        Commands::Thresholds => commands::thresholds::print_defaults(),
    }
}
