//! threadmerge CLI binary.
//!
//! This binary provides command-line access to threadmerge:
//! - Merge discussions, or preview the merge
//! - Apply database migrations
//! - Resolve redirected discussion ids

use clap::Parser;
use threadmerge::ThreadmergeConfig;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, resolve_discussion, run_merge, run_migrate};

    // Load .env before anything reads DATABASE_URL
    let _ = dotenvy::dotenv();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }

    let config = ThreadmergeConfig::load_with(cli.config.as_deref())?;

    // Execute the requested command
    match cli.command {
        Commands::Merge(args) => {
            run_merge(&config, args).await?;
        }

        Commands::Migrate => {
            run_migrate(&config)?;
        }

        Commands::Resolve { id } => {
            resolve_discussion(&config, id)?;
        }
    }

    Ok(())
}
