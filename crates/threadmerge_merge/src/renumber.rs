//! Post renumbering strategies.
//!
//! Every function here is pure: it takes posts and returns posts with
//! `discussion_id` and `number` reassigned, leaving persistence to the caller.
//! Sorting is stable, so posts created at the same instant keep the relative
//! order they were given in.

use threadmerge_core::{DiscussionId, Post};
use threadmerge_interface::PostPlacement;

/// Interleave `existing` and `incoming` by creation time and number them
/// `offset + 1 ..= offset + N` inside `target`.
///
/// `existing` is taken in number order, followed by `incoming` in the order
/// given; that sequence breaks creation-time ties.
pub fn chronological(
    target: DiscussionId,
    existing: &[Post],
    incoming: &[Post],
    offset: u32,
) -> Vec<Post> {
    let mut posts = by_number(existing);
    posts.extend(incoming.iter().cloned());
    posts.sort_by_key(|post| post.created_at);
    assign(target, posts, offset)
}

/// Keep `existing` where it is and number `incoming`, ordered by creation
/// time, from one past the highest existing number.
pub fn append(target: DiscussionId, existing: &[Post], incoming: &[Post]) -> Vec<Post> {
    let mut posts = by_number(existing);
    let last = posts.iter().map(|post| post.number).max().unwrap_or(0);

    let mut appended = incoming.to_vec();
    appended.sort_by_key(|post| post.created_at);
    posts.extend(assign(target, appended, last));
    posts
}

/// Lowest offset at which parking `existing` and `incoming` cannot collide
/// with any number currently used in the target.
pub fn park_offset(existing: &[Post], incoming: &[Post]) -> u32 {
    let total = u32::try_from(existing.len() + incoming.len()).unwrap_or(u32::MAX);
    let highest = existing.iter().map(|post| post.number).max().unwrap_or(0);
    total.max(highest)
}

/// Whether a discussion's numbering has holes left by deleted posts.
///
/// Housekeeping posts count too: they hold a number in the discussion, so
/// leaving them out would report a hole wherever one exists.
pub fn has_gaps(posts: &[Post]) -> bool {
    let highest = posts.iter().map(|post| post.number).max().unwrap_or(0);
    usize::try_from(highest).map_or(true, |highest| highest != posts.len())
}

/// Renumber one discussion `1..=N` by creation time if it has gaps.
///
/// Returns `None` when the numbering is already contiguous, which makes the
/// pass idempotent.
pub fn fix_gaps(posts: &[Post]) -> Option<Vec<Post>> {
    let discussion_id = posts.first()?.discussion_id;
    if !has_gaps(posts) {
        return None;
    }
    Some(chronological(discussion_id, posts, &[], 0))
}

/// Placements writing every post where it now sits.
pub fn placements(posts: &[Post]) -> Vec<PostPlacement> {
    posts.iter().map(PostPlacement::from).collect()
}

/// Placements for posts of `after` whose position differs from `before`.
pub fn changed_placements(before: &[Post], after: &[Post]) -> Vec<PostPlacement> {
    after
        .iter()
        .filter(|post| {
            !before
                .iter()
                .any(|old| old.id == post.id && old.is_placed_at(post.discussion_id, post.number))
        })
        .map(PostPlacement::from)
        .collect()
}

fn by_number(posts: &[Post]) -> Vec<Post> {
    let mut sorted = posts.to_vec();
    sorted.sort_by_key(|post| post.number);
    sorted
}

fn assign(target: DiscussionId, posts: Vec<Post>, offset: u32) -> Vec<Post> {
    posts
        .into_iter()
        .zip(offset + 1..)
        .map(|(mut post, number)| {
            post.discussion_id = target;
            post.number = number;
            post
        })
        .collect()
}
