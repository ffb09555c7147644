//! Core data types for threadmerge.
//!
//! This crate provides the discussion, post, subscription and redirection
//! records the merge engine reads and rewrites, plus the command and outcome
//! types that cross the engine's boundary.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod command;
mod discussion;
mod ids;
mod outcome;
mod post;
mod redirection;
mod subscription;

pub use command::{Actor, MergeCommand, MergeCommandBuilder, MergeCommandBuilderError, MergeOrdering};
pub use discussion::{Discussion, DiscussionMetadata};
pub use ids::{DiscussionId, PostId, UserId};
pub use outcome::{DiscussionMerged, MergedDiscussion};
pub use post::{Post, PostType};
pub use redirection::Redirection;
pub use subscription::{Subscription, SubscriptionState};
pub use threadmerge_error::MergeStep;
