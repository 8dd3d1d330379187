//! Folio CLI - static documentation site builder.
//!
//! Provides commands for:
//! - `start`: Build with drafts, serve and rebuild on change
//! - `build`: Build the production site
//! - `serve`: Serve a built site
//! - `deploy`: Build and push the site to a git branch
//! - `check`: Validate content and links without writing output

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, CheckArgs, DeployArgs, ServeArgs, StartArgs};
use error::CliError;
use output::Output;

/// Folio - static documentation site builder.
#[derive(Parser)]
#[command(name = "folio", version, about)]
struct Cli {
    /// Show progress logs (info level).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the dev server with live rebuilds.
    Start(StartArgs),
    /// Build the static site.
    Build(BuildArgs),
    /// Serve the built site.
    Serve(ServeArgs),
    /// Build and publish the site to a git branch.
    Deploy(DeployArgs),
    /// Check content, navigation and links without writing output.
    Check(CheckArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Start(args) => block_on(args.execute()),
        Commands::Serve(args) => block_on(args.execute()),
        Commands::Build(args) => args.execute(),
        Commands::Deploy(args) => args.execute(),
        Commands::Check(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

fn block_on(future: impl Future<Output = Result<(), CliError>>) -> Result<(), CliError> {
    tokio::runtime::Runtime::new()?.block_on(future)
}
