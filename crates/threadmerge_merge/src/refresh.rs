//! Denormalized discussion field recomputation.
//!
//! Counts and pointers are always rebuilt from the full post set; cached
//! values are never adjusted incrementally across a structural change.

use std::collections::HashSet;
use threadmerge_core::{DiscussionId, DiscussionMetadata, MergedDiscussion, Post};
use threadmerge_error::{DatabaseError, DatabaseErrorKind, DatabaseResult};
use threadmerge_interface::DiscussionStore;
use tracing::{debug, instrument};

/// Summary fields for a discussion holding exactly `posts`.
///
/// Housekeeping posts occupy numbers, so they can be the first or last post,
/// but they are neither comments nor participation.
pub fn summarize(posts: &[Post]) -> DiscussionMetadata {
    let eligible: Vec<&Post> = posts.iter().filter(|post| !post.is_housekeeping()).collect();
    let participants: HashSet<_> = eligible.iter().filter_map(|post| post.user_id).collect();

    let first = posts.iter().find(|post| post.number == 1);
    let last = posts.iter().max_by_key(|post| post.number);

    DiscussionMetadata {
        comment_count: count(eligible.len()),
        participant_count: count(participants.len()),
        last_post_number: last.map(|post| post.number),
        first_post_id: first.map(|post| post.id),
        last_post_id: last.map(|post| post.id),
        last_posted_at: last.map(|post| post.created_at),
    }
}

/// Reload `id` from the store, recompute its summary fields and persist them.
///
/// # Errors
///
/// Fails with [`DatabaseErrorKind::NotFound`] if the discussion is gone, or
/// with whatever the store raises.
#[instrument(skip(store))]
pub fn refresh_discussion<S: DiscussionStore>(
    store: &mut S,
    id: DiscussionId,
) -> DatabaseResult<MergedDiscussion> {
    let mut discussion = store
        .find_discussion(id)?
        .ok_or_else(|| DatabaseError::new(DatabaseErrorKind::NotFound))?;
    let posts = store.posts_in(&[id])?;

    let metadata = summarize(&posts);
    store.save_metadata(id, &metadata)?;
    discussion.apply_metadata(&metadata);

    debug!(
        comment_count = metadata.comment_count,
        participant_count = metadata.participant_count,
        last_post_number = ?metadata.last_post_number,
        "Refreshed discussion metadata"
    );

    Ok(MergedDiscussion { discussion, posts })
}

fn count(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
