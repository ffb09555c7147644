//! Discussion merge engine.
//!
//! Merges any number of discussions into one target while keeping post
//! numbers contiguous and unique, moving follower subscriptions, and leaving
//! a redirection behind for every discussion that disappears.
//!
//! # Components
//!
//! - [`renumber`] - pure numbering strategies and the gap-fix pass
//! - [`MergePlan`] - the candidate post set split into existing and incoming
//! - [`refresh`] - recomputes denormalized discussion fields
//! - [`subscriptions`] - two-pass follower migration
//! - [`redirect`] - redirection records and source deletion
//! - [`DiscussionMerger`] - the orchestrator driving one transaction
//! - [`MergeService`] - async wrapper running the orchestrator off the runtime
//!
//! # Example
//!
//! ```rust,ignore
//! use threadmerge_merge::{DiscussionMerger, MergeCollaborators};
//!
//! let mut merger = DiscussionMerger::new(store, collaborators);
//! let merged = merger.execute(&command)?;
//! println!("{} posts", merged.posts.len());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod merger;
mod plan;
pub mod redirect;
pub mod refresh;
pub mod renumber;
mod service;
pub mod subscriptions;

pub use merger::{DiscussionMerger, MergeCollaborators, SUBSCRIPTIONS_EXTENSION};
pub use plan::MergePlan;
pub use service::MergeService;
