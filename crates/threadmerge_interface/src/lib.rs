//! Trait definitions for threadmerge.
//!
//! The merge engine never reaches for ambient services: the store, the
//! authorization check, the mergeability predicate, feature flags,
//! translation and event delivery are all handed in through these traits.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod collaborators;
mod store;

pub use collaborators::{
    DiscussionMerging, ExtensionCheck, MergeAuthorizer, MergeEventSink, PostValidator, Translator,
};
pub use store::{DiscussionStore, PostPlacement};
