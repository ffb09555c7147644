//! Snapshot-based in-memory store.

use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use threadmerge_core::{
    Discussion, DiscussionId, DiscussionMetadata, Post, PostId, Redirection, Subscription,
    SubscriptionState, UserId,
};
use threadmerge_error::{DatabaseError, DatabaseErrorKind, DatabaseResult};
use threadmerge_interface::{DiscussionStore, PostPlacement};
use tracing::{debug, instrument, warn};

/// Store operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum StoreOperation {
    /// Any discussion read
    #[display("find discussions")]
    FindDiscussions,
    /// Post reads
    #[display("load posts")]
    LoadPosts,
    /// Post placement writes
    #[display("place posts")]
    PlacePosts,
    /// Metadata writes
    #[display("save metadata")]
    SaveMetadata,
    /// Subscription reads
    #[display("load subscriptions")]
    LoadSubscriptions,
    /// Subscription writes
    #[display("write subscriptions")]
    WriteSubscriptions,
    /// Redirection inserts
    #[display("insert redirection")]
    InsertRedirection,
    /// Discussion deletes
    #[display("delete discussion")]
    DeleteDiscussion,
    /// Committing the outermost transaction
    #[display("commit")]
    Commit,
}

#[derive(Debug, Clone, Default)]
struct State {
    discussions: BTreeMap<DiscussionId, Discussion>,
    posts: BTreeMap<PostId, Post>,
    subscriptions: BTreeMap<(DiscussionId, UserId), Subscription>,
    redirections: BTreeMap<DiscussionId, Redirection>,
}

/// In-memory, map-based discussion store.
///
/// Intended for tests and embedding. Transactions nest like savepoints: an
/// inner commit only becomes durable once the outermost transaction commits.
#[derive(Debug, Default)]
pub struct InMemoryDiscussionStore {
    state: State,
    snapshots: Vec<State>,
    /// Remaining successful calls before an operation starts failing.
    failures: HashMap<StoreOperation, usize>,
    commits: usize,
}

impl InMemoryDiscussionStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a discussion, replacing any discussion with the same id.
    pub fn insert_discussion(&mut self, discussion: Discussion) {
        self.state.discussions.insert(discussion.id, discussion);
    }

    /// Seed a post.
    ///
    /// # Errors
    ///
    /// Fails if the discussion already has a post with the same number.
    pub fn insert_post(&mut self, post: Post) -> DatabaseResult<()> {
        self.ensure_number_free(post.id, post.discussion_id, post.number)?;
        self.state.posts.insert(post.id, post);
        Ok(())
    }

    /// Seed a subscription row, replacing any row for the same pair.
    pub fn insert_subscription(&mut self, subscription: Subscription) {
        self.state.subscriptions.insert(
            (subscription.discussion_id, subscription.user_id),
            subscription,
        );
    }

    /// Current committed-or-pending view of a discussion.
    pub fn discussion(&self, id: DiscussionId) -> Option<&Discussion> {
        self.state.discussions.get(&id)
    }

    /// Posts of one discussion ordered by number.
    pub fn posts_of(&self, id: DiscussionId) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .state
            .posts
            .values()
            .filter(|post| post.discussion_id == id)
            .cloned()
            .collect();
        posts.sort_by_key(|post| post.number);
        posts
    }

    /// A single post by id.
    pub fn post(&self, id: PostId) -> Option<&Post> {
        self.state.posts.get(&id)
    }

    /// Subscription rows of one discussion ordered by user.
    pub fn subscriptions_of(&self, id: DiscussionId) -> Vec<Subscription> {
        self.state
            .subscriptions
            .values()
            .filter(|row| row.discussion_id == id)
            .cloned()
            .collect()
    }

    /// Every redirection ordered by old id.
    pub fn redirections(&self) -> Vec<Redirection> {
        self.state.redirections.values().cloned().collect()
    }

    /// Number of outermost transactions committed so far.
    pub fn commits(&self) -> usize {
        self.commits
    }

    /// Whether a transaction is currently open.
    pub fn in_transaction(&self) -> bool {
        !self.snapshots.is_empty()
    }

    /// Make every future call of `operation` fail.
    pub fn fail_on(&mut self, operation: StoreOperation) {
        self.fail_after(operation, 0);
    }

    /// Let `operation` succeed `successes` more times, then fail.
    pub fn fail_after(&mut self, operation: StoreOperation, successes: usize) {
        self.failures.insert(operation, successes);
    }

    /// Remove all injected failures.
    pub fn clear_failures(&mut self) {
        self.failures.clear();
    }

    fn check(&mut self, operation: StoreOperation) -> DatabaseResult<()> {
        match self.failures.get_mut(&operation) {
            Some(0) => {
                debug!(%operation, "Injected failure");
                Err(DatabaseError::new(DatabaseErrorKind::Query(format!(
                    "injected failure in {}",
                    operation
                ))))
            }
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    fn ensure_number_free(
        &self,
        post_id: PostId,
        discussion_id: DiscussionId,
        number: u32,
    ) -> DatabaseResult<()> {
        let taken = self
            .state
            .posts
            .values()
            .any(|other| other.id != post_id && other.is_placed_at(discussion_id, number));
        if taken {
            return Err(DatabaseError::new(DatabaseErrorKind::UniqueViolation {
                discussion_id: discussion_id.get(),
                number: i64::from(number),
            }));
        }
        Ok(())
    }
}

impl DiscussionStore for InMemoryDiscussionStore {
    fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<DatabaseError>,
    {
        self.snapshots.push(self.state.clone());
        debug!(depth = self.snapshots.len(), "Begin transaction");

        let outcome = f(self).and_then(|value| {
            if self.snapshots.len() == 1 {
                self.check(StoreOperation::Commit)?;
            }
            Ok(value)
        });

        let snapshot = self.snapshots.pop();
        match outcome {
            Ok(value) => {
                if self.snapshots.is_empty() {
                    self.commits += 1;
                }
                Ok(value)
            }
            Err(err) => {
                match snapshot {
                    Some(snapshot) => self.state = snapshot,
                    None => warn!("Rollback without snapshot"),
                }
                debug!(depth = self.snapshots.len() + 1, "Rolled back transaction");
                Err(err)
            }
        }
    }

    fn find_discussion(&mut self, id: DiscussionId) -> DatabaseResult<Option<Discussion>> {
        self.check(StoreOperation::FindDiscussions)?;
        Ok(self.state.discussions.get(&id).cloned())
    }

    fn find_discussions(&mut self, ids: &[DiscussionId]) -> DatabaseResult<Vec<Discussion>> {
        self.check(StoreOperation::FindDiscussions)?;
        Ok(ids
            .iter()
            .filter_map(|id| self.state.discussions.get(id).cloned())
            .collect())
    }

    fn posts_in(&mut self, ids: &[DiscussionId]) -> DatabaseResult<Vec<Post>> {
        self.check(StoreOperation::LoadPosts)?;
        let mut posts: Vec<Post> = self
            .state
            .posts
            .values()
            .filter(|post| ids.contains(&post.discussion_id))
            .cloned()
            .collect();
        posts.sort_by_key(|post| (post.discussion_id, post.number));
        Ok(posts)
    }

    #[instrument(skip(self, placements), fields(count = placements.len()))]
    fn place_posts(&mut self, placements: &[PostPlacement]) -> DatabaseResult<()> {
        self.check(StoreOperation::PlacePosts)?;
        for placement in placements {
            if !self.state.posts.contains_key(&placement.post_id) {
                return Err(DatabaseError::new(DatabaseErrorKind::NotFound));
            }
            self.ensure_number_free(placement.post_id, placement.discussion_id, placement.number)?;
            if let Some(post) = self.state.posts.get_mut(&placement.post_id) {
                post.discussion_id = placement.discussion_id;
                post.number = placement.number;
            }
        }
        Ok(())
    }

    fn save_metadata(
        &mut self,
        id: DiscussionId,
        metadata: &DiscussionMetadata,
    ) -> DatabaseResult<()> {
        self.check(StoreOperation::SaveMetadata)?;
        let discussion = self
            .state
            .discussions
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::new(DatabaseErrorKind::NotFound))?;
        discussion.apply_metadata(metadata);
        Ok(())
    }

    fn subscriptions_in(&mut self, ids: &[DiscussionId]) -> DatabaseResult<Vec<Subscription>> {
        self.check(StoreOperation::LoadSubscriptions)?;
        Ok(self
            .state
            .subscriptions
            .values()
            .filter(|row| ids.contains(&row.discussion_id))
            .cloned()
            .collect())
    }

    fn move_subscription(
        &mut self,
        user_id: UserId,
        from: DiscussionId,
        to: DiscussionId,
        last_read_post_number: Option<u32>,
    ) -> DatabaseResult<()> {
        self.check(StoreOperation::WriteSubscriptions)?;
        if self.state.subscriptions.contains_key(&(to, user_id)) {
            return Err(DatabaseError::new(DatabaseErrorKind::Constraint(format!(
                "user {} already has a row on discussion {}",
                user_id, to
            ))));
        }
        let mut row = self
            .state
            .subscriptions
            .remove(&(from, user_id))
            .ok_or_else(|| DatabaseError::new(DatabaseErrorKind::NotFound))?;
        row.discussion_id = to;
        row.state = Some(SubscriptionState::Follow);
        row.last_read_post_number = last_read_post_number;
        self.state.subscriptions.insert((to, user_id), row);
        Ok(())
    }

    fn set_subscription_state(
        &mut self,
        discussion_id: DiscussionId,
        user_id: UserId,
        state: Option<SubscriptionState>,
    ) -> DatabaseResult<()> {
        self.check(StoreOperation::WriteSubscriptions)?;
        let row = self
            .state
            .subscriptions
            .get_mut(&(discussion_id, user_id))
            .ok_or_else(|| DatabaseError::new(DatabaseErrorKind::NotFound))?;
        row.state = state;
        Ok(())
    }

    fn insert_redirection(
        &mut self,
        old: DiscussionId,
        new: DiscussionId,
    ) -> DatabaseResult<Redirection> {
        self.check(StoreOperation::InsertRedirection)?;
        if self.state.redirections.contains_key(&old) {
            return Err(DatabaseError::new(DatabaseErrorKind::Constraint(format!(
                "discussion {} already redirects",
                old
            ))));
        }
        let redirection = Redirection {
            old_discussion_id: old,
            new_discussion_id: new,
            created_at: Utc::now(),
        };
        self.state.redirections.insert(old, redirection.clone());
        Ok(redirection)
    }

    fn find_redirection(&mut self, old: DiscussionId) -> DatabaseResult<Option<Redirection>> {
        Ok(self.state.redirections.get(&old).cloned())
    }

    fn delete_discussion(&mut self, id: DiscussionId) -> DatabaseResult<()> {
        self.check(StoreOperation::DeleteDiscussion)?;
        if self.state.discussions.remove(&id).is_none() {
            return Err(DatabaseError::new(DatabaseErrorKind::NotFound));
        }
        self.state.posts.retain(|_, post| post.discussion_id != id);
        self.state
            .subscriptions
            .retain(|(discussion_id, _), _| *discussion_id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use threadmerge_core::PostType;

    fn discussion(id: i64) -> Discussion {
        Discussion {
            id: DiscussionId::new(id),
            title: format!("Discussion {}", id),
            comment_count: 0,
            participant_count: 0,
            last_post_number: None,
            first_post_id: None,
            last_post_id: None,
            last_posted_at: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn post(id: i64, discussion_id: i64, number: u32) -> Post {
        Post {
            id: PostId::new(id),
            discussion_id: DiscussionId::new(discussion_id),
            number,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
                + chrono::Duration::minutes(id),
            user_id: Some(UserId::new(1)),
            post_type: PostType::Comment,
        }
    }

    #[test]
    fn test_duplicate_number_is_rejected() {
        let mut store = InMemoryDiscussionStore::new();
        store.insert_discussion(discussion(1));
        store.insert_post(post(1, 1, 1)).unwrap();
        store.insert_post(post(2, 1, 2)).unwrap();

        let err = store
            .place_posts(&[PostPlacement {
                post_id: PostId::new(2),
                discussion_id: DiscussionId::new(1),
                number: 1,
            }])
            .unwrap_err();
        assert!(matches!(
            err.kind,
            DatabaseErrorKind::UniqueViolation { discussion_id: 1, number: 1 }
        ));
    }

    #[test]
    fn test_rollback_restores_state() {
        let mut store = InMemoryDiscussionStore::new();
        store.insert_discussion(discussion(1));
        store.insert_post(post(1, 1, 1)).unwrap();

        let result: Result<(), DatabaseError> = store.transaction(|store| {
            store.place_posts(&[PostPlacement {
                post_id: PostId::new(1),
                discussion_id: DiscussionId::new(1),
                number: 9,
            }])?;
            store.delete_discussion(DiscussionId::new(1))?;
            Err(DatabaseError::new(DatabaseErrorKind::Query("boom".into())))
        });

        assert!(result.is_err());
        assert!(store.discussion(DiscussionId::new(1)).is_some());
        assert_eq!(store.posts_of(DiscussionId::new(1))[0].number, 1);
        assert_eq!(store.commits(), 0);
        assert!(!store.in_transaction());
    }

    #[test]
    fn test_commit_failure_rolls_back() {
        let mut store = InMemoryDiscussionStore::new();
        store.insert_discussion(discussion(1));
        store.fail_on(StoreOperation::Commit);

        let result: Result<(), DatabaseError> =
            store.transaction(|store| store.delete_discussion(DiscussionId::new(1)));

        assert!(result.is_err());
        assert!(store.discussion(DiscussionId::new(1)).is_some());
    }

    #[test]
    fn test_inner_commit_is_undone_by_outer_rollback() {
        let mut store = InMemoryDiscussionStore::new();
        store.insert_discussion(discussion(1));

        let result: Result<(), DatabaseError> = store.transaction(|store| {
            store.transaction(|store| store.delete_discussion(DiscussionId::new(1)))?;
            Err(DatabaseError::new(DatabaseErrorKind::Query("outer".into())))
        });

        assert!(result.is_err());
        assert!(store.discussion(DiscussionId::new(1)).is_some());
    }

    #[test]
    fn test_fail_after_counts_successes() {
        let mut store = InMemoryDiscussionStore::new();
        store.fail_after(StoreOperation::FindDiscussions, 1);

        assert!(store.find_discussion(DiscussionId::new(1)).is_ok());
        assert!(store.find_discussion(DiscussionId::new(1)).is_err());
        store.clear_failures();
        assert!(store.find_discussion(DiscussionId::new(1)).is_ok());
    }

    #[test]
    fn test_delete_cascades_posts_and_subscriptions() {
        let mut store = InMemoryDiscussionStore::new();
        store.insert_discussion(discussion(1));
        store.insert_post(post(1, 1, 1)).unwrap();
        store.insert_subscription(Subscription {
            discussion_id: DiscussionId::new(1),
            user_id: UserId::new(4),
            state: Some(SubscriptionState::Follow),
            last_read_post_number: Some(1),
        });

        store.delete_discussion(DiscussionId::new(1)).unwrap();

        assert!(store.post(PostId::new(1)).is_none());
        assert!(store.subscriptions_of(DiscussionId::new(1)).is_empty());
    }

    #[test]
    fn test_move_subscription_refuses_existing_target_row() {
        let mut store = InMemoryDiscussionStore::new();
        for discussion_id in [1, 2] {
            store.insert_subscription(Subscription {
                discussion_id: DiscussionId::new(discussion_id),
                user_id: UserId::new(4),
                state: None,
                last_read_post_number: None,
            });
        }

        let err = store
            .move_subscription(UserId::new(4), DiscussionId::new(2), DiscussionId::new(1), None)
            .unwrap_err();
        assert!(matches!(err.kind, DatabaseErrorKind::Constraint(_)));
    }
}
