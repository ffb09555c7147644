//! External collaborators consulted by the merge engine.

use async_trait::async_trait;
use threadmerge_core::{Actor, Discussion, DiscussionMerged, MergeCommand, MergedDiscussion, Post};
use threadmerge_error::MergeResult;

/// Decides whether an actor may merge into a discussion.
pub trait MergeAuthorizer: Send + Sync {
    /// `true` if `actor` may merge other discussions into `discussion`.
    fn can_merge(&self, actor: &Actor, discussion: &Discussion) -> bool;
}

/// The mergeability predicate for a candidate post set.
pub trait PostValidator: Send + Sync {
    /// Accept the posts or explain every reason they cannot be merged.
    ///
    /// # Errors
    ///
    /// Returns one human-readable reason per violated rule.
    fn assert_valid(&self, posts: &[Post]) -> Result<(), Vec<String>>;
}

/// Feature-flag lookup.
pub trait ExtensionCheck: Send + Sync {
    /// Whether the named extension is enabled.
    fn is_enabled(&self, name: &str) -> bool;
}

/// Turns message keys into user-facing text.
pub trait Translator: Send + Sync {
    /// Translate `key`; unknown keys come back unchanged.
    fn translate(&self, key: &str) -> String;
}

/// Receives the post-commit domain event.
///
/// Delivery is fire-and-forget: the merge has already committed and cannot
/// be affected by what the sink does.
pub trait MergeEventSink: Send + Sync {
    /// Handle a committed merge.
    fn discussion_merged(&self, event: &DiscussionMerged);
}

/// Asynchronous entry point for callers living on an async runtime.
#[async_trait]
pub trait DiscussionMerging: Send + Sync {
    /// Execute a merge command.
    async fn merge(&self, command: MergeCommand) -> MergeResult<MergedDiscussion>;
}
