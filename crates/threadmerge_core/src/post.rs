//! Posts and post types.

use crate::{DiscussionId, PostId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::str::FromStr;

/// Discriminator stored in a post's `type` column.
///
/// Only comments and the tag-change event matter to merging; every other
/// system event round-trips through [`PostType::Other`].
///
/// # Examples
///
/// ```
/// use threadmerge_core::PostType;
///
/// let tagged: PostType = "discussionTagged".parse().unwrap();
/// assert!(tagged.is_housekeeping());
/// assert_eq!(PostType::Other("discussionRenamed".into()).as_str(), "discussionRenamed");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PostType {
    /// Regular user comment
    Comment,
    /// System event recording a tag change on its discussion
    DiscussionTagged,
    /// Any other system event type
    Other(String),
}

impl PostType {
    /// The stored representation.
    pub fn as_str(&self) -> &str {
        match self {
            PostType::Comment => "comment",
            PostType::DiscussionTagged => "discussionTagged",
            PostType::Other(name) => name,
        }
    }

    /// Housekeeping posts belong to their discussion and never migrate.
    pub fn is_housekeeping(&self) -> bool {
        matches!(self, PostType::DiscussionTagged)
    }
}

impl FromStr for PostType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(PostType::from(s.to_string()))
    }
}

impl From<String> for PostType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "comment" => PostType::Comment,
            "discussionTagged" => PostType::DiscussionTagged,
            _ => PostType::Other(value),
        }
    }
}

impl From<PostType> for String {
    fn from(value: PostType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for PostType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A post inside a discussion.
///
/// `number` is the post's 1-based position in its discussion; committed
/// discussions always number their posts `1..=N` without gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Post identity
    pub id: PostId,
    /// Owning discussion
    pub discussion_id: DiscussionId,
    /// Position within the discussion
    pub number: u32,
    /// Chronological sort key
    pub created_at: DateTime<Utc>,
    /// Author, if the account still exists
    pub user_id: Option<UserId>,
    /// Type discriminator
    pub post_type: PostType,
}

impl Post {
    /// Whether this post is excluded from merge eligibility and counts.
    pub fn is_housekeeping(&self) -> bool {
        self.post_type.is_housekeeping()
    }

    /// Whether this post sits at `number` in `discussion_id`.
    pub fn is_placed_at(&self, discussion_id: DiscussionId, number: u32) -> bool {
        self.discussion_id == discussion_id && self.number == number
    }
}
