//! PostgreSQL implementation of DiscussionStore.

use crate::models::{
    DiscussionRow, MetadataChangeset, PostRow, RedirectionRow, SubscriptionRow, to_i32,
};
use crate::schema::{discussion_redirections, discussion_user, discussions, posts};
use chrono::Utc;
use diesel::connection::{AnsiTransactionManager, TransactionManager};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind as DieselKind, Error as DieselError};
use threadmerge_core::{
    Discussion, DiscussionId, DiscussionMetadata, Post, Redirection, Subscription,
    SubscriptionState, UserId,
};
use threadmerge_error::{DatabaseError, DatabaseErrorKind, DatabaseResult};
use threadmerge_interface::{DiscussionStore, PostPlacement};
use tracing::{debug, instrument, warn};

/// PostgreSQL discussion store using Diesel ORM.
///
/// Owns one connection. Nested [`DiscussionStore::transaction`] calls become
/// savepoints, so an inner failure can be rolled back without losing the
/// outer transaction.
///
/// # Example
/// ```no_run
/// use threadmerge_database::{PgDiscussionStore, establish_connection};
///
/// let store = PgDiscussionStore::new(establish_connection()?);
/// # Ok::<(), threadmerge_error::DatabaseError>(())
/// ```
pub struct PgDiscussionStore {
    conn: PgConnection,
}

impl PgDiscussionStore {
    /// Create a store over an open connection.
    pub fn new(conn: PgConnection) -> Self {
        Self { conn }
    }

    /// The underlying connection.
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.conn
    }

    /// Give the connection back.
    pub fn into_inner(self) -> PgConnection {
        self.conn
    }

    /// Insert a discussion row as-is.
    ///
    /// # Errors
    ///
    /// Propagates insert failures.
    pub fn insert_discussion(&mut self, discussion: &Discussion) -> DatabaseResult<()> {
        diesel::insert_into(discussions::table)
            .values(&DiscussionRow::try_from(discussion)?)
            .execute(&mut self.conn)?;
        Ok(())
    }

    /// Insert a post row as-is.
    ///
    /// # Errors
    ///
    /// Fails on a duplicate `(discussion_id, number)`.
    pub fn insert_post(&mut self, post: &Post) -> DatabaseResult<()> {
        diesel::insert_into(posts::table)
            .values(&PostRow::try_from(post)?)
            .execute(&mut self.conn)
            .map_err(|e| placement_error(e, post.discussion_id.get(), post.number))?;
        Ok(())
    }

    /// Insert a subscription row as-is.
    ///
    /// # Errors
    ///
    /// Fails if the user already has a row for the discussion.
    pub fn insert_subscription(&mut self, subscription: &Subscription) -> DatabaseResult<()> {
        diesel::insert_into(discussion_user::table)
            .values(&SubscriptionRow::try_from(subscription)?)
            .execute(&mut self.conn)?;
        Ok(())
    }
}

/// Attach the contested position to unique violations on `posts`.
fn placement_error(err: DieselError, discussion_id: i64, number: u32) -> DatabaseError {
    match err {
        DieselError::DatabaseError(DieselKind::UniqueViolation, _) => {
            DatabaseError::new(DatabaseErrorKind::UniqueViolation {
                discussion_id,
                number: i64::from(number),
            })
        }
        other => DatabaseError::from(other),
    }
}

fn raw_ids(ids: &[DiscussionId]) -> Vec<i64> {
    ids.iter().map(|id| id.get()).collect()
}

impl DiscussionStore for PgDiscussionStore {
    fn transaction<T, E, F>(&mut self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Self) -> Result<T, E>,
        E: From<DatabaseError>,
    {
        AnsiTransactionManager::begin_transaction(&mut self.conn)
            .map_err(|e| E::from(DatabaseError::new(DatabaseErrorKind::Transaction(e.to_string()))))?;

        match f(self) {
            Ok(value) => {
                AnsiTransactionManager::commit_transaction(&mut self.conn).map_err(|e| {
                    E::from(DatabaseError::new(DatabaseErrorKind::Transaction(e.to_string())))
                })?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = AnsiTransactionManager::rollback_transaction(&mut self.conn)
                {
                    warn!(error = %rollback, "Rollback failed");
                }
                Err(err)
            }
        }
    }

    #[instrument(skip(self))]
    fn find_discussion(&mut self, id: DiscussionId) -> DatabaseResult<Option<Discussion>> {
        discussions::table
            .find(id.get())
            .select(DiscussionRow::as_select())
            .first::<DiscussionRow>(&mut self.conn)
            .optional()?
            .map(Discussion::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    fn find_discussions(&mut self, ids: &[DiscussionId]) -> DatabaseResult<Vec<Discussion>> {
        discussions::table
            .filter(discussions::id.eq_any(raw_ids(ids)))
            .select(DiscussionRow::as_select())
            .load::<DiscussionRow>(&mut self.conn)?
            .into_iter()
            .map(Discussion::try_from)
            .collect()
    }

    #[instrument(skip(self))]
    fn posts_in(&mut self, ids: &[DiscussionId]) -> DatabaseResult<Vec<Post>> {
        let rows: Vec<PostRow> = posts::table
            .filter(posts::discussion_id.eq_any(raw_ids(ids)))
            .order((posts::discussion_id.asc(), posts::number.asc()))
            .select(PostRow::as_select())
            .load(&mut self.conn)?;
        debug!(count = rows.len(), "Loaded posts");
        rows.into_iter().map(Post::try_from).collect()
    }

    #[instrument(skip(self, placements), fields(count = placements.len()))]
    fn place_posts(&mut self, placements: &[PostPlacement]) -> DatabaseResult<()> {
        for placement in placements {
            let discussion_id = placement.discussion_id.get();
            let updated = diesel::update(posts::table.find(placement.post_id.get()))
                .set((
                    posts::discussion_id.eq(discussion_id),
                    posts::number.eq(to_i32(placement.number, "number")?),
                ))
                .execute(&mut self.conn)
                .map_err(|e| placement_error(e, discussion_id, placement.number))?;
            if updated == 0 {
                return Err(DatabaseError::new(DatabaseErrorKind::NotFound));
            }
        }
        Ok(())
    }

    #[instrument(skip(self, metadata))]
    fn save_metadata(
        &mut self,
        id: DiscussionId,
        metadata: &DiscussionMetadata,
    ) -> DatabaseResult<()> {
        let updated = diesel::update(discussions::table.find(id.get()))
            .set(&MetadataChangeset::try_from(metadata)?)
            .execute(&mut self.conn)?;
        if updated == 0 {
            return Err(DatabaseError::new(DatabaseErrorKind::NotFound));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    fn subscriptions_in(&mut self, ids: &[DiscussionId]) -> DatabaseResult<Vec<Subscription>> {
        discussion_user::table
            .filter(discussion_user::discussion_id.eq_any(raw_ids(ids)))
            .order((discussion_user::discussion_id.asc(), discussion_user::user_id.asc()))
            .select(SubscriptionRow::as_select())
            .load::<SubscriptionRow>(&mut self.conn)?
            .into_iter()
            .map(Subscription::try_from)
            .collect()
    }

    #[instrument(skip(self))]
    fn move_subscription(
        &mut self,
        user_id: UserId,
        from: DiscussionId,
        to: DiscussionId,
        last_read_post_number: Option<u32>,
    ) -> DatabaseResult<()> {
        let last_read = last_read_post_number
            .map(|n| to_i32(n, "last_read_post_number"))
            .transpose()?;
        let updated = diesel::update(discussion_user::table.find((from.get(), user_id.get())))
            .set((
                discussion_user::discussion_id.eq(to.get()),
                discussion_user::subscription.eq(Some(SubscriptionState::Follow.to_string())),
                discussion_user::last_read_post_number.eq(last_read),
            ))
            .execute(&mut self.conn)?;
        if updated == 0 {
            return Err(DatabaseError::new(DatabaseErrorKind::NotFound));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    fn set_subscription_state(
        &mut self,
        discussion_id: DiscussionId,
        user_id: UserId,
        state: Option<SubscriptionState>,
    ) -> DatabaseResult<()> {
        let updated =
            diesel::update(discussion_user::table.find((discussion_id.get(), user_id.get())))
                .set(discussion_user::subscription.eq(state.map(|state| state.to_string())))
                .execute(&mut self.conn)?;
        if updated == 0 {
            return Err(DatabaseError::new(DatabaseErrorKind::NotFound));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    fn insert_redirection(
        &mut self,
        old: DiscussionId,
        new: DiscussionId,
    ) -> DatabaseResult<Redirection> {
        let row = RedirectionRow {
            old_discussion_id: old.get(),
            new_discussion_id: new.get(),
            created_at: Utc::now(),
        };
        let inserted: RedirectionRow = diesel::insert_into(discussion_redirections::table)
            .values(&row)
            .returning(RedirectionRow::as_returning())
            .get_result(&mut self.conn)?;
        Ok(inserted.into())
    }

    #[instrument(skip(self))]
    fn find_redirection(&mut self, old: DiscussionId) -> DatabaseResult<Option<Redirection>> {
        Ok(discussion_redirections::table
            .find(old.get())
            .select(RedirectionRow::as_select())
            .first::<RedirectionRow>(&mut self.conn)
            .optional()?
            .map(Redirection::from))
    }

    #[instrument(skip(self))]
    fn delete_discussion(&mut self, id: DiscussionId) -> DatabaseResult<()> {
        diesel::delete(posts::table.filter(posts::discussion_id.eq(id.get())))
            .execute(&mut self.conn)?;
        diesel::delete(discussion_user::table.filter(discussion_user::discussion_id.eq(id.get())))
            .execute(&mut self.conn)?;
        let deleted = diesel::delete(discussions::table.find(id.get())).execute(&mut self.conn)?;
        if deleted == 0 {
            return Err(DatabaseError::new(DatabaseErrorKind::NotFound));
        }
        debug!("Deleted discussion");
        Ok(())
    }
}
