//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use threadmerge::MergeOrdering;

/// threadmerge - merge forum discussions into one
#[derive(Parser, Debug)]
#[command(name = "threadmerge")]
#[command(about = "Merge forum discussions into one", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Configuration file replacing the home and working directory files
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Merge discussions into a target discussion
    Merge(MergeArgs),

    /// Apply pending database migrations
    Migrate,

    /// Follow redirections from a discussion id to where it lives now
    Resolve {
        /// Discussion id, possibly of a merged discussion
        id: i64,
    },
}

/// Arguments of the merge command
#[derive(clap::Args, Debug)]
pub struct MergeArgs {
    /// Discussion that absorbs the others
    #[arg(long)]
    pub target: i64,

    /// Discussions to merge, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    pub ids: Vec<i64>,

    /// Numbering strategy: "date" or "suffix"
    #[arg(long)]
    pub ordering: Option<MergeOrdering>,

    /// Persist the merge instead of printing the projection
    #[arg(long)]
    pub commit: bool,

    /// User performing the merge
    #[arg(long)]
    pub actor: i64,
}
