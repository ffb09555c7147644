//! The inbound merge command.

use crate::{DiscussionId, UserId};
use serde::{Deserialize, Serialize};

/// The user performing a merge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    /// User id
    pub id: UserId,
    /// Display name, used only for logging
    pub username: Option<String>,
}

impl Actor {
    /// Create an actor without a display name.
    pub fn new(id: UserId) -> Self {
        Self { id, username: None }
    }
}

/// How merged posts are numbered.
///
/// # Examples
///
/// ```
/// use threadmerge_core::MergeOrdering;
///
/// let ordering: MergeOrdering = "suffix".parse().unwrap();
/// assert_eq!(ordering, MergeOrdering::Append);
/// assert_eq!(MergeOrdering::Chronological.to_string(), "date");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumString,
    strum::Display,
    strum::AsRefStr,
    strum::EnumIter,
)]
pub enum MergeOrdering {
    /// Interleave every post by creation time and renumber 1..N
    #[default]
    #[serde(rename = "date")]
    #[strum(serialize = "date")]
    Chronological,
    /// Keep target numbers; append incoming posts by creation time
    #[serde(rename = "suffix")]
    #[strum(serialize = "suffix")]
    Append,
}

/// Request to merge `ids` into `target`.
///
/// # Examples
///
/// ```
/// use threadmerge_core::{Actor, DiscussionId, MergeCommand, MergeOrdering, UserId};
///
/// let command = MergeCommand::builder()
///     .actor(Actor::new(UserId::new(1)))
///     .target(DiscussionId::new(10))
///     .ids(vec![DiscussionId::new(11), DiscussionId::new(10), DiscussionId::new(11)])
///     .ordering(MergeOrdering::Append)
///     .build()
///     .unwrap();
///
/// assert_eq!(command.discussion_ids(), vec![DiscussionId::new(10), DiscussionId::new(11)]);
/// assert!(!command.commit);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct MergeCommand {
    /// User performing the merge
    pub actor: Actor,
    /// Discussion that absorbs the others
    pub target: DiscussionId,
    /// Every discussion involved
    #[builder(default)]
    pub ids: Vec<DiscussionId>,
    /// Persist the merge; `false` only computes the projection
    #[builder(default)]
    pub commit: bool,
    /// Numbering strategy
    #[builder(default)]
    pub ordering: MergeOrdering,
}

impl MergeCommand {
    /// Creates a new command builder.
    pub fn builder() -> MergeCommandBuilder {
        MergeCommandBuilder::default()
    }

    /// The target followed by every other requested id, without duplicates.
    pub fn discussion_ids(&self) -> Vec<DiscussionId> {
        let mut ids = vec![self.target];
        for id in &self.ids {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }

    /// Requested ids other than the target.
    pub fn source_ids(&self) -> Vec<DiscussionId> {
        self.discussion_ids().into_iter().skip(1).collect()
    }
}
