//! Row types and their conversions to domain types.

use crate::schema::{discussion_redirections, discussion_user, discussions, posts};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use threadmerge_core::{
    Discussion, DiscussionId, DiscussionMetadata, Post, PostId, PostType, Redirection,
    Subscription, SubscriptionState, UserId,
};
use threadmerge_error::{DatabaseError, DatabaseErrorKind, DatabaseResult};

/// Database row for the discussions table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = discussions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DiscussionRow {
    pub id: i64,
    pub title: String,
    pub comment_count: i32,
    pub participant_count: i32,
    pub last_post_number: Option<i32>,
    pub first_post_id: Option<i64>,
    pub last_post_id: Option<i64>,
    pub last_posted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Database row for the posts table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PostRow {
    pub id: i64,
    pub discussion_id: i64,
    pub number: i32,
    pub created_at: DateTime<Utc>,
    pub user_id: Option<i64>,
    pub post_type: String,
}

/// Database row for the discussion_user table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = discussion_user)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SubscriptionRow {
    pub discussion_id: i64,
    pub user_id: i64,
    pub subscription: Option<String>,
    pub last_read_post_number: Option<i32>,
}

/// Database row for the discussion_redirections table.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = discussion_redirections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RedirectionRow {
    pub old_discussion_id: i64,
    pub new_discussion_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Changeset rewriting the denormalized discussion fields.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = discussions)]
#[diesel(treat_none_as_null = true)]
pub struct MetadataChangeset {
    pub comment_count: i32,
    pub participant_count: i32,
    pub last_post_number: Option<i32>,
    pub first_post_id: Option<i64>,
    pub last_post_id: Option<i64>,
    pub last_posted_at: Option<DateTime<Utc>>,
}

/// Read a non-negative column into a count or post number.
pub(crate) fn to_u32(value: i32, column: &str) -> DatabaseResult<u32> {
    u32::try_from(value).map_err(|_| {
        DatabaseError::new(DatabaseErrorKind::Constraint(format!(
            "{} holds negative value {}",
            column, value
        )))
    })
}

/// Write a count or post number into an INTEGER column.
pub(crate) fn to_i32(value: u32, column: &str) -> DatabaseResult<i32> {
    i32::try_from(value).map_err(|_| {
        DatabaseError::new(DatabaseErrorKind::Constraint(format!(
            "{} value {} does not fit in INTEGER",
            column, value
        )))
    })
}

impl TryFrom<DiscussionRow> for Discussion {
    type Error = DatabaseError;

    fn try_from(row: DiscussionRow) -> DatabaseResult<Self> {
        Ok(Self {
            id: DiscussionId::new(row.id),
            title: row.title,
            comment_count: to_u32(row.comment_count, "comment_count")?,
            participant_count: to_u32(row.participant_count, "participant_count")?,
            last_post_number: row
                .last_post_number
                .map(|n| to_u32(n, "last_post_number"))
                .transpose()?,
            first_post_id: row.first_post_id.map(PostId::new),
            last_post_id: row.last_post_id.map(PostId::new),
            last_posted_at: row.last_posted_at,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<&Discussion> for DiscussionRow {
    type Error = DatabaseError;

    fn try_from(discussion: &Discussion) -> DatabaseResult<Self> {
        let changes = MetadataChangeset::try_from(&discussion.metadata())?;
        Ok(Self {
            id: discussion.id.get(),
            title: discussion.title.clone(),
            comment_count: changes.comment_count,
            participant_count: changes.participant_count,
            last_post_number: changes.last_post_number,
            first_post_id: changes.first_post_id,
            last_post_id: changes.last_post_id,
            last_posted_at: changes.last_posted_at,
            created_at: discussion.created_at,
        })
    }
}

impl TryFrom<PostRow> for Post {
    type Error = DatabaseError;

    fn try_from(row: PostRow) -> DatabaseResult<Self> {
        Ok(Self {
            id: PostId::new(row.id),
            discussion_id: DiscussionId::new(row.discussion_id),
            number: to_u32(row.number, "number")?,
            created_at: row.created_at,
            user_id: row.user_id.map(UserId::new),
            post_type: PostType::from(row.post_type),
        })
    }
}

impl TryFrom<&Post> for PostRow {
    type Error = DatabaseError;

    fn try_from(post: &Post) -> DatabaseResult<Self> {
        Ok(Self {
            id: post.id.get(),
            discussion_id: post.discussion_id.get(),
            number: to_i32(post.number, "number")?,
            created_at: post.created_at,
            user_id: post.user_id.map(|id| id.get()),
            post_type: post.post_type.as_str().to_string(),
        })
    }
}

impl TryFrom<SubscriptionRow> for Subscription {
    type Error = DatabaseError;

    fn try_from(row: SubscriptionRow) -> DatabaseResult<Self> {
        let state = row
            .subscription
            .map(|value| {
                value.parse::<SubscriptionState>().map_err(|_| {
                    DatabaseError::new(DatabaseErrorKind::Constraint(format!(
                        "unknown subscription state '{}'",
                        value
                    )))
                })
            })
            .transpose()?;

        Ok(Self {
            discussion_id: DiscussionId::new(row.discussion_id),
            user_id: UserId::new(row.user_id),
            state,
            last_read_post_number: row
                .last_read_post_number
                .map(|n| to_u32(n, "last_read_post_number"))
                .transpose()?,
        })
    }
}

impl TryFrom<&Subscription> for SubscriptionRow {
    type Error = DatabaseError;

    fn try_from(subscription: &Subscription) -> DatabaseResult<Self> {
        Ok(Self {
            discussion_id: subscription.discussion_id.get(),
            user_id: subscription.user_id.get(),
            subscription: subscription.state.map(|state| state.to_string()),
            last_read_post_number: subscription
                .last_read_post_number
                .map(|n| to_i32(n, "last_read_post_number"))
                .transpose()?,
        })
    }
}

impl From<RedirectionRow> for Redirection {
    fn from(row: RedirectionRow) -> Self {
        Self {
            old_discussion_id: DiscussionId::new(row.old_discussion_id),
            new_discussion_id: DiscussionId::new(row.new_discussion_id),
            created_at: row.created_at,
        }
    }
}

impl TryFrom<&DiscussionMetadata> for MetadataChangeset {
    type Error = DatabaseError;

    fn try_from(metadata: &DiscussionMetadata) -> DatabaseResult<Self> {
        Ok(Self {
            comment_count: to_i32(metadata.comment_count, "comment_count")?,
            participant_count: to_i32(metadata.participant_count, "participant_count")?,
            last_post_number: metadata
                .last_post_number
                .map(|n| to_i32(n, "last_post_number"))
                .transpose()?,
            first_post_id: metadata.first_post_id.map(|id| id.get()),
            last_post_id: metadata.last_post_id.map(|id| id.get()),
            last_posted_at: metadata.last_posted_at,
        })
    }
}
