//! Transactional discussion store.

use threadmerge_core::{
    Discussion, DiscussionId, DiscussionMetadata, Post, PostId, Redirection, Subscription,
    SubscriptionState, UserId,
};
use threadmerge_error::{DatabaseError, DatabaseResult};

/// New position for one post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostPlacement {
    /// Post being moved
    pub post_id: PostId,
    /// Discussion the post ends up in
    pub discussion_id: DiscussionId,
    /// Number the post ends up with
    pub number: u32,
}

impl From<&Post> for PostPlacement {
    fn from(post: &Post) -> Self {
        Self {
            post_id: post.id,
            discussion_id: post.discussion_id,
            number: post.number,
        }
    }
}

/// Relational store holding discussions, posts, subscriptions and
/// redirections.
///
/// Implementations must enforce uniqueness of `(discussion_id, number)` on
/// every write, so callers renumbering in place have to route posts through
/// a collision-free range first.
///
/// Reads take `&mut self` because database connections are exclusive.
pub trait DiscussionStore {
    /// Run `f` inside one transaction.
    ///
    /// Everything `f` writes becomes visible atomically when it returns `Ok`
    /// and is discarded entirely when it returns `Err`.
    ///
    /// # Errors
    ///
    /// Returns the closure's error, or a converted [`DatabaseError`] when the
    /// transaction cannot begin or commit.
    fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<DatabaseError>;

    /// Load one discussion.
    fn find_discussion(&mut self, id: DiscussionId) -> DatabaseResult<Option<Discussion>>;

    /// Load every existing discussion among `ids`, in no particular order.
    fn find_discussions(&mut self, ids: &[DiscussionId]) -> DatabaseResult<Vec<Discussion>>;

    /// Load every post of the given discussions, ordered by discussion id
    /// then number.
    fn posts_in(&mut self, ids: &[DiscussionId]) -> DatabaseResult<Vec<Post>>;

    /// Apply placements one row at a time, in slice order.
    fn place_posts(&mut self, placements: &[PostPlacement]) -> DatabaseResult<()>;

    /// Persist recomputed summary fields.
    fn save_metadata(
        &mut self,
        id: DiscussionId,
        metadata: &DiscussionMetadata,
    ) -> DatabaseResult<()>;

    /// Load every subscription row of the given discussions.
    fn subscriptions_in(&mut self, ids: &[DiscussionId]) -> DatabaseResult<Vec<Subscription>>;

    /// Re-home one user's row from `from` to `to` as a follow with the given
    /// read position.
    fn move_subscription(
        &mut self,
        user_id: UserId,
        from: DiscussionId,
        to: DiscussionId,
        last_read_post_number: Option<u32>,
    ) -> DatabaseResult<()>;

    /// Overwrite the explicit subscription choice on an existing row.
    fn set_subscription_state(
        &mut self,
        discussion_id: DiscussionId,
        user_id: UserId,
        state: Option<SubscriptionState>,
    ) -> DatabaseResult<()>;

    /// Record that `old` now lives at `new`.
    fn insert_redirection(
        &mut self,
        old: DiscussionId,
        new: DiscussionId,
    ) -> DatabaseResult<Redirection>;

    /// Load the redirection recorded for `old`, if any.
    fn find_redirection(&mut self, old: DiscussionId) -> DatabaseResult<Option<Redirection>>;

    /// Delete a discussion together with its remaining posts and
    /// subscription rows.
    fn delete_discussion(&mut self, id: DiscussionId) -> DatabaseResult<()>;

    /// Follow redirections from `id` until reaching a discussion that was
    /// not merged away.
    ///
    /// Cycles cannot be produced by merging, but a hand-edited table could
    /// contain one; the walk stops after visiting each id once.
    fn resolve_redirection(&mut self, id: DiscussionId) -> DatabaseResult<DiscussionId> {
        let mut current = id;
        let mut seen = vec![id];
        while let Some(redirection) = self.find_redirection(current)? {
            if seen.contains(&redirection.new_discussion_id) {
                break;
            }
            current = redirection.new_discussion_id;
            seen.push(current);
        }
        Ok(current)
    }
}
