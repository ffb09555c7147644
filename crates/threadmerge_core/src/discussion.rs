//! Discussions and their denormalized summary fields.

use crate::{DiscussionId, PostId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A discussion thread.
///
/// The count and pointer fields are denormalized from the post table and are
/// only trustworthy right after [`Discussion::apply_metadata`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discussion {
    /// Discussion identity
    pub id: DiscussionId,
    /// Title shown in listings
    pub title: String,
    /// Number of eligible (non-housekeeping) posts
    pub comment_count: u32,
    /// Number of distinct eligible post authors
    pub participant_count: u32,
    /// Highest post number in the discussion
    pub last_post_number: Option<u32>,
    /// Post numbered 1
    pub first_post_id: Option<PostId>,
    /// Post with the highest number
    pub last_post_id: Option<PostId>,
    /// Creation time of the last post
    pub last_posted_at: Option<DateTime<Utc>>,
    /// When the discussion was started
    pub created_at: DateTime<Utc>,
}

impl Discussion {
    /// Overwrite the denormalized fields with freshly computed values.
    pub fn apply_metadata(&mut self, metadata: &DiscussionMetadata) {
        self.comment_count = metadata.comment_count;
        self.participant_count = metadata.participant_count;
        self.last_post_number = metadata.last_post_number;
        self.first_post_id = metadata.first_post_id;
        self.last_post_id = metadata.last_post_id;
        self.last_posted_at = metadata.last_posted_at;
    }

    /// The denormalized fields as currently stored.
    pub fn metadata(&self) -> DiscussionMetadata {
        DiscussionMetadata {
            comment_count: self.comment_count,
            participant_count: self.participant_count,
            last_post_number: self.last_post_number,
            first_post_id: self.first_post_id,
            last_post_id: self.last_post_id,
            last_posted_at: self.last_posted_at,
        }
    }
}

/// Summary fields derived from a discussion's post set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscussionMetadata {
    /// Number of eligible posts
    pub comment_count: u32,
    /// Number of distinct eligible post authors
    pub participant_count: u32,
    /// Highest post number
    pub last_post_number: Option<u32>,
    /// Post numbered 1
    pub first_post_id: Option<PostId>,
    /// Post with the highest number
    pub last_post_id: Option<PostId>,
    /// Creation time of the last post
    pub last_posted_at: Option<DateTime<Utc>>,
}
