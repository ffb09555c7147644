//! Merge forum discussions into one.
//!
//! This crate ties the workspace together: it re-exports the domain types,
//! the merge engine and both stores, loads layered configuration, and builds
//! the default collaborators the engine consults.
//!
//! # Example
//!
//! ```rust,ignore
//! use threadmerge::{DiscussionMerger, ThreadmergeConfig, collaborators_from_config};
//! use threadmerge::{PgDiscussionStore, establish_connection};
//!
//! let config = ThreadmergeConfig::load()?;
//! let store = PgDiscussionStore::new(establish_connection()?);
//! let mut merger = DiscussionMerger::new(store, collaborators_from_config(&config));
//! let merged = merger.execute(&command)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod collaborators;
mod settings;

pub use collaborators::{
    CatalogTranslator, ConfiguredExtensions, TracingEventSink, collaborators_from_config,
};
pub use settings::{DatabaseConfig, MergeConfig, ThreadmergeConfig};

pub use threadmerge_core::*;
pub use threadmerge_database::{
    PgDiscussionStore, connect, establish_connection, run_migrations,
};
pub use threadmerge_error::{
    ConfigError, ConfigErrorKind, DatabaseError, DatabaseErrorKind, MergeError, MergeErrorKind,
    MergeResult, ThreadmergeError, ThreadmergeErrorKind, ThreadmergeResult,
};
pub use threadmerge_interface::{
    DiscussionMerging, DiscussionStore, ExtensionCheck, MergeAuthorizer, MergeEventSink,
    PostPlacement, PostValidator, Translator,
};
pub use threadmerge_merge::{
    DiscussionMerger, MergeCollaborators, MergePlan, MergeService, SUBSCRIPTIONS_EXTENSION,
};
pub use threadmerge_security::{
    MergeValidator, PermissionChecker, PermissionConfig, ValidationConfig,
};
pub use threadmerge_storage::{InMemoryDiscussionStore, StoreOperation};
