//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the threadmerge binary.

mod commands;
mod database;
mod merge;

pub use commands::{Cli, Commands, MergeArgs};
pub use database::{open_store, resolve_discussion, run_migrate};
pub use merge::run_merge;
