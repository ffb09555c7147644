//! Follower subscription migration.
//!
//! Runs as two explicit set operations over the loaded rows:
//!
//! 1. followers of a source with no row on the target get their row moved
//!    to the target (anti-join);
//! 2. target rows without an explicit choice whose user followed a source
//!    are upgraded to follow (semi-join).
//!
//! Explicit choices on the target, including "ignore", are never touched.

use std::collections::{BTreeMap, HashMap};
use threadmerge_core::{DiscussionId, SubscriptionState, UserId};
use threadmerge_error::DatabaseResult;
use threadmerge_interface::DiscussionStore;
use tracing::{debug, instrument};

/// What a migration changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationReport {
    /// Rows moved from a source to the target
    pub moved: usize,
    /// Target rows upgraded to follow
    pub upgraded: usize,
}

/// Make every follower of `sources` a follower of `target`.
///
/// Moved rows get `last_read_post_number` set to the target's new last post
/// number. A user following several sources keeps only the row of the first
/// source in `sources`; the others are removed with their discussion.
///
/// # Errors
///
/// Propagates store failures unchanged.
#[instrument(skip(store, sources), fields(sources = sources.len()))]
pub fn migrate_subscriptions<S: DiscussionStore>(
    store: &mut S,
    target: DiscussionId,
    sources: &[DiscussionId],
    last_post_number: Option<u32>,
) -> DatabaseResult<MigrationReport> {
    let mut report = MigrationReport::default();
    if sources.is_empty() {
        return Ok(report);
    }

    let target_rows: HashMap<UserId, Option<SubscriptionState>> = store
        .subscriptions_in(&[target])?
        .into_iter()
        .map(|row| (row.user_id, row.state))
        .collect();
    let source_rows = store.subscriptions_in(sources)?;

    let mut followers: BTreeMap<UserId, DiscussionId> = BTreeMap::new();
    for source in sources {
        for row in source_rows
            .iter()
            .filter(|row| row.discussion_id == *source && row.is_following())
        {
            followers.entry(row.user_id).or_insert(*source);
        }
    }

    for (user_id, from) in &followers {
        if !target_rows.contains_key(user_id) {
            store.move_subscription(*user_id, *from, target, last_post_number)?;
            report.moved += 1;
        }
    }

    for (user_id, state) in &target_rows {
        if state.is_none() && followers.contains_key(user_id) {
            store.set_subscription_state(target, *user_id, Some(SubscriptionState::Follow))?;
            report.upgraded += 1;
        }
    }

    debug!(
        moved = report.moved,
        upgraded = report.upgraded,
        "Migrated subscriptions"
    );
    Ok(report)
}
