//! The post set a merge operates on.

use crate::renumber;
use threadmerge_core::{DiscussionId, MergeOrdering, Post};

/// Posts loaded for a merge, split by where they come from.
///
/// The target keeps all of its posts, housekeeping ones included, because
/// they occupy numbers in its sequence. Housekeeping posts of other
/// discussions never migrate; they disappear with their discussion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergePlan {
    target: DiscussionId,
    existing: Vec<Post>,
    incoming: Vec<Post>,
}

impl MergePlan {
    /// Split `posts` loaded from `ids` into the target's posts and the
    /// eligible posts moving in.
    ///
    /// Incoming posts follow the order of `ids`, then their old numbers.
    pub fn new(target: DiscussionId, ids: &[DiscussionId], posts: Vec<Post>) -> Self {
        let (mut existing, others): (Vec<Post>, Vec<Post>) = posts
            .into_iter()
            .partition(|post| post.discussion_id == target);
        existing.sort_by_key(|post| post.number);

        let mut incoming: Vec<Post> = others
            .into_iter()
            .filter(|post| !post.is_housekeeping())
            .collect();
        incoming.sort_by_key(|post| {
            let position = ids
                .iter()
                .position(|id| *id == post.discussion_id)
                .unwrap_or(usize::MAX);
            (position, post.number)
        });

        Self {
            target,
            existing,
            incoming,
        }
    }

    /// The discussion absorbing the others.
    pub fn target(&self) -> DiscussionId {
        self.target
    }

    /// Posts already in the target, by number.
    pub fn existing(&self) -> &[Post] {
        &self.existing
    }

    /// Eligible posts moving into the target.
    pub fn incoming(&self) -> &[Post] {
        &self.incoming
    }

    /// Every post the mergeability predicate has to accept.
    pub fn candidates(&self) -> Vec<Post> {
        self.existing
            .iter()
            .filter(|post| !post.is_housekeeping())
            .chain(self.incoming.iter())
            .cloned()
            .collect()
    }

    /// Every post the plan touches, in their current positions.
    pub fn current(&self) -> Vec<Post> {
        self.existing
            .iter()
            .chain(self.incoming.iter())
            .cloned()
            .collect()
    }

    /// The final post set under `ordering`, ordered by new number.
    pub fn renumber(&self, ordering: MergeOrdering) -> Vec<Post> {
        match ordering {
            MergeOrdering::Chronological => {
                renumber::chronological(self.target, &self.existing, &self.incoming, 0)
            }
            MergeOrdering::Append => {
                renumber::append(self.target, &self.existing, &self.incoming)
            }
        }
    }

    /// The chronological post set shifted into a range no current target
    /// number can occupy.
    pub fn parked(&self) -> Vec<Post> {
        let offset = renumber::park_offset(&self.existing, &self.incoming);
        renumber::chronological(self.target, &self.existing, &self.incoming, offset)
    }
}
