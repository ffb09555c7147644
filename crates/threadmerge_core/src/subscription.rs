//! Per-user discussion state.

use crate::{DiscussionId, UserId};
use serde::{Deserialize, Serialize};

/// Explicit subscription choice a user made on a discussion.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::AsRefStr,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SubscriptionState {
    /// Notify the user about new posts
    Follow,
    /// Never notify the user
    Ignore,
}

/// A `discussion_user` row.
///
/// A row with `state == None` only tracks read progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Discussion the row belongs to
    pub discussion_id: DiscussionId,
    /// User the row belongs to
    pub user_id: UserId,
    /// Explicit subscription choice, if any
    pub state: Option<SubscriptionState>,
    /// Number of the last post the user has read
    pub last_read_post_number: Option<u32>,
}

impl Subscription {
    /// Whether the user follows the discussion.
    pub fn is_following(&self) -> bool {
        self.state == Some(SubscriptionState::Follow)
    }
}
