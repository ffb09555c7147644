//! Results of a merge.

use crate::{Actor, Discussion, Post};
use serde::{Deserialize, Serialize};

/// The target discussion with its post collection attached.
///
/// For a dry run this is the projected state; nothing was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedDiscussion {
    /// Target discussion with refreshed summary fields
    pub discussion: Discussion,
    /// Every post of the target, ordered by number
    pub posts: Vec<Post>,
}

/// Domain event emitted once a merge has committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionMerged {
    /// Who merged
    pub actor: Actor,
    /// The renumbered post set
    pub posts: Vec<Post>,
    /// The resulting target discussion
    pub discussion: Discussion,
    /// Discussions that were merged away, as they were before the merge
    pub source_discussions: Vec<Discussion>,
}
