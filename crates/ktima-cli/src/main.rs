// crates/ktima-cli/src/main.rs

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
use commands::inspect::{handle_inspect, InspectArgs};
use commands::sources::{handle_sources, SourcesArgs};
use commands::trends::{handle_trends, TrendsArgs};

/// Trend analytics for real-estate transaction tables
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Aggregate transaction sources into period trends
    Trends(TrendsArgs),
    /// Show the columns and filterable values of one source
    Inspect(InspectArgs),
    /// List a built-in source directory with its year tokens
    Sources(SourcesArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Trends(args) => handle_trends(args),
        Commands::Inspect(args) => handle_inspect(args),
        Commands::Sources(args) => handle_sources(args),
    }
}
