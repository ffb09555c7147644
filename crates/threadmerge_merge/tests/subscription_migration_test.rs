//! Follower migration during merges.

mod common;

use common::*;
use std::sync::Arc;
use threadmerge_core::{DiscussionId, MergeOrdering, Subscription, SubscriptionState, UserId};
use threadmerge_merge::DiscussionMerger;
use threadmerge_storage::InMemoryDiscussionStore;

fn subscription(
    discussion_id: DiscussionId,
    user: i64,
    state: Option<SubscriptionState>,
    last_read: Option<u32>,
) -> Subscription {
    Subscription {
        discussion_id,
        user_id: UserId::new(user),
        state,
        last_read_post_number: last_read,
    }
}

fn row(store: &InMemoryDiscussionStore, discussion: DiscussionId, user: i64) -> Option<Subscription> {
    store
        .subscriptions_of(discussion)
        .into_iter()
        .find(|row| row.user_id == UserId::new(user))
}

fn merge_all(harness: &mut Harness) {
    harness
        .merger
        .execute(&command(
            &[TARGET, SOURCE, OTHER_SOURCE],
            MergeOrdering::Chronological,
            true,
        ))
        .unwrap();
}

#[test]
fn test_follower_of_two_sources_gets_one_row() {
    let mut store = three_way_scenario();
    store.insert_subscription(subscription(SOURCE, 10, Some(SubscriptionState::Follow), Some(2)));
    store.insert_subscription(subscription(
        OTHER_SOURCE,
        10,
        Some(SubscriptionState::Follow),
        Some(1),
    ));
    let mut harness = harness(store);

    merge_all(&mut harness);

    let store = harness.merger.store();
    let rows: Vec<_> = store
        .subscriptions_of(TARGET)
        .into_iter()
        .filter(|row| row.user_id == UserId::new(10))
        .collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].state, Some(SubscriptionState::Follow));
    assert_eq!(rows[0].last_read_post_number, Some(6));
    assert!(store.subscriptions_of(SOURCE).is_empty());
    assert!(store.subscriptions_of(OTHER_SOURCE).is_empty());
}

#[test]
fn test_unset_target_row_is_upgraded() {
    let mut store = scenario();
    store.insert_subscription(subscription(TARGET, 11, None, Some(3)));
    store.insert_subscription(subscription(SOURCE, 11, Some(SubscriptionState::Follow), Some(1)));
    let mut harness = harness(store);

    merge_all_two(&mut harness);

    let row = row(harness.merger.store(), TARGET, 11).unwrap();
    assert_eq!(row.state, Some(SubscriptionState::Follow));
    assert_eq!(row.last_read_post_number, Some(3));
}

#[test]
fn test_ignore_on_target_is_kept() {
    let mut store = scenario();
    store.insert_subscription(subscription(
        TARGET,
        12,
        Some(SubscriptionState::Ignore),
        Some(1),
    ));
    store.insert_subscription(subscription(SOURCE, 12, Some(SubscriptionState::Follow), None));
    let mut harness = harness(store);

    merge_all_two(&mut harness);

    let row = row(harness.merger.store(), TARGET, 12).unwrap();
    assert_eq!(row.state, Some(SubscriptionState::Ignore));
    assert_eq!(row.last_read_post_number, Some(1));
}

#[test]
fn test_non_followers_are_not_moved() {
    let mut store = scenario();
    store.insert_subscription(subscription(SOURCE, 13, None, Some(2)));
    store.insert_subscription(subscription(SOURCE, 14, Some(SubscriptionState::Ignore), None));
    let mut harness = harness(store);

    merge_all_two(&mut harness);

    let store = harness.merger.store();
    assert!(row(store, TARGET, 13).is_none());
    assert!(row(store, TARGET, 14).is_none());
    assert!(store.subscriptions_of(SOURCE).is_empty());
}

#[test]
fn test_disabled_extension_skips_migration() {
    let mut store = scenario();
    store.insert_subscription(subscription(SOURCE, 10, Some(SubscriptionState::Follow), None));
    let (collaborators, _events) =
        collaborators(Arc::new(AllowAll), Arc::new(AcceptAll), Vec::new());
    let mut merger = DiscussionMerger::new(store, collaborators);

    merger
        .execute(&command(&[TARGET, SOURCE], MergeOrdering::Append, true))
        .unwrap();

    assert!(row(merger.store(), TARGET, 10).is_none());
    assert!(merger.store().subscriptions_of(SOURCE).is_empty());
}

#[test]
fn test_dry_run_moves_no_subscriptions() {
    let mut store = scenario();
    store.insert_subscription(subscription(SOURCE, 10, Some(SubscriptionState::Follow), None));
    let mut harness = harness(store);

    harness
        .merger
        .execute(&command(&[TARGET, SOURCE], MergeOrdering::Append, false))
        .unwrap();

    assert!(row(harness.merger.store(), TARGET, 10).is_none());
    assert!(row(harness.merger.store(), SOURCE, 10).is_some());
}

fn merge_all_two(harness: &mut Harness) {
    harness
        .merger
        .execute(&command(&[TARGET, SOURCE], MergeOrdering::Chronological, true))
        .unwrap();
}
