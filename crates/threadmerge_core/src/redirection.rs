//! Redirection audit records.

use crate::DiscussionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maps a merged-away discussion id to the discussion that absorbed it.
///
/// Written once, never updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirection {
    /// The deleted discussion
    pub old_discussion_id: DiscussionId,
    /// The merge target
    pub new_discussion_id: DiscussionId,
    /// When the merge committed
    pub created_at: DateTime<Utc>,
}
