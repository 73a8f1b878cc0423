//! Waypoint CLI - Site navigation resolution.
//!
//! Provides commands for:
//! - `resolve`: Resolve a URI against the master and a user sitemap
//! - `tree`: Print the navigation tree a subject sees
//! - `check`: Build the master sitemap with all checks enabled

mod commands;
mod error;
mod loader;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, ResolveArgs, TreeArgs};
use output::Output;

/// Waypoint - Site navigation resolution.
#[derive(Parser)]
#[command(name = "waypoint", version, about)]
struct Cli {
    /// Enable verbose output (info-level logging).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a URI to its node, view and redirect.
    Resolve(ResolveArgs),
    /// Print the navigation tree visible to a subject.
    Tree(TreeArgs),
    /// Build the master sitemap and report problems.
    Check(CheckArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Resolve(args) => args.execute(),
        Commands::Tree(args) => args.execute(),
        Commands::Check(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
