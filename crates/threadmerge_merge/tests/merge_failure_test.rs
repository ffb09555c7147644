//! Rejections and rollbacks.

mod common;

use common::*;
use std::sync::Arc;
use threadmerge_core::{DiscussionId, MergeOrdering, MergeStep, Post, PostId};
use threadmerge_error::MergeErrorKind;
use threadmerge_storage::{InMemoryDiscussionStore, StoreOperation};

fn all_posts(store: &InMemoryDiscussionStore) -> Vec<Post> {
    let mut posts = store.posts_of(TARGET);
    posts.extend(store.posts_of(SOURCE));
    posts
}

fn assert_untouched(harness: &Harness, before: &[Post]) {
    let store = harness.merger.store();
    assert_eq!(all_posts(store), before);
    assert!(store.discussion(SOURCE).is_some());
    assert!(store.redirections().is_empty());
    assert!(!store.in_transaction());
    assert!(harness.events.events().is_empty());
}

fn assert_step_failed(
    store: InMemoryDiscussionStore,
    ordering: MergeOrdering,
    expected: MergeStep,
) {
    let before = all_posts(&store);
    let mut harness = harness(store);

    let err = harness
        .merger
        .execute(&command(&[TARGET, SOURCE], ordering, true))
        .unwrap_err();

    assert_eq!(err.step(), Some(expected));
    match err.kind() {
        MergeErrorKind::MergeFailed { message, .. } => {
            assert_eq!(
                message,
                &format!("translated:{}", expected.message_key())
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_untouched(&harness, &before);
}

#[test]
fn test_missing_target_is_not_found() {
    let mut harness = harness(scenario());
    let mut command = command(&[SOURCE], MergeOrdering::Chronological, true);
    command.target = DiscussionId::new(404);

    let err = harness.merger.execute(&command).unwrap_err();

    assert_eq!(err.kind(), &MergeErrorKind::NotFound(404));
}

#[test]
fn test_missing_source_is_not_found() {
    let mut harness = harness(scenario());
    let before = all_posts(harness.merger.store());

    let err = harness
        .merger
        .execute(&command(
            &[TARGET, SOURCE, DiscussionId::new(77)],
            MergeOrdering::Append,
            true,
        ))
        .unwrap_err();

    assert_eq!(err.kind(), &MergeErrorKind::NotFound(77));
    assert_untouched(&harness, &before);
}

#[test]
fn test_forbidden_actor_reads_no_posts() {
    let mut store = scenario();
    store.fail_on(StoreOperation::LoadPosts);
    let mut harness = harness_with(store, Arc::new(DenyAll), Arc::new(AcceptAll));

    let err = harness
        .merger
        .execute(&command(&[TARGET, SOURCE], MergeOrdering::Chronological, true))
        .unwrap_err();

    assert_eq!(
        err.kind(),
        &MergeErrorKind::Forbidden {
            actor: 99,
            discussion: 1
        }
    );
}

#[test]
fn test_validation_rejection_writes_nothing() {
    let store = scenario();
    let before = all_posts(&store);
    let mut harness = harness_with(
        store,
        Arc::new(AllowAll),
        Arc::new(RejectPost(PostId::new(202))),
    );

    let err = harness
        .merger
        .execute(&command(&[TARGET, SOURCE], MergeOrdering::Append, true))
        .unwrap_err();

    match err.kind() {
        MergeErrorKind::Validation(reasons) => {
            assert_eq!(reasons, &vec!["post 202 cannot be moved".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_untouched(&harness, &before);
}

#[test]
fn test_validation_rejection_applies_to_dry_runs() {
    let mut harness = harness_with(
        scenario(),
        Arc::new(AllowAll),
        Arc::new(RejectPost(PostId::new(101))),
    );

    let err = harness
        .merger
        .execute(&command(&[TARGET, SOURCE], MergeOrdering::Append, false))
        .unwrap_err();

    assert!(matches!(err.kind(), MergeErrorKind::Validation(_)));
}

#[test]
fn test_gap_fix_failure_rolls_back() {
    let mut store = InMemoryDiscussionStore::new();
    store.insert_discussion(discussion(TARGET));
    store.insert_discussion(discussion(SOURCE));
    store.insert_post(comment(101, TARGET, 1, 10, 1)).unwrap();
    store.insert_post(comment(102, TARGET, 3, 20, 1)).unwrap();
    store.insert_post(comment(201, SOURCE, 1, 5, 2)).unwrap();
    store.fail_after(StoreOperation::PlacePosts, 1);
    assert_step_failed(store, MergeOrdering::Chronological, MergeStep::GapFix);
}

#[test]
fn test_park_failure_rolls_back() {
    let mut store = scenario();
    store.fail_on(StoreOperation::PlacePosts);
    assert_step_failed(store, MergeOrdering::Chronological, MergeStep::ParkRenumber);
}

#[test]
fn test_compact_failure_rolls_back() {
    let mut store = scenario();
    store.fail_after(StoreOperation::PlacePosts, 1);
    assert_step_failed(store, MergeOrdering::Chronological, MergeStep::CompactRenumber);
}

#[test]
fn test_append_failure_rolls_back() {
    let mut store = scenario();
    store.fail_on(StoreOperation::PlacePosts);
    assert_step_failed(store, MergeOrdering::Append, MergeStep::AppendRenumber);
}

#[test]
fn test_metadata_failure_rolls_back() {
    let mut store = scenario();
    store.fail_on(StoreOperation::SaveMetadata);
    assert_step_failed(store, MergeOrdering::Chronological, MergeStep::MetadataRefresh);
}

#[test]
fn test_subscription_failure_rolls_back() {
    let mut store = scenario();
    store.fail_on(StoreOperation::LoadSubscriptions);
    assert_step_failed(
        store,
        MergeOrdering::Chronological,
        MergeStep::SubscriptionMigration,
    );
}

#[test]
fn test_redirection_failure_rolls_back() {
    let mut store = scenario();
    store.fail_on(StoreOperation::DeleteDiscussion);
    assert_step_failed(store, MergeOrdering::Append, MergeStep::Redirection);
}

#[test]
fn test_redirection_insert_failure_rolls_back() {
    let mut store = scenario();
    store.fail_on(StoreOperation::InsertRedirection);
    assert_step_failed(store, MergeOrdering::Chronological, MergeStep::Redirection);
}

#[test]
fn test_commit_failure_rolls_back() {
    let mut store = scenario();
    store.fail_on(StoreOperation::Commit);
    assert_step_failed(store, MergeOrdering::Append, MergeStep::Commit);
}

#[test]
fn test_merge_succeeds_once_failure_clears() {
    let mut store = scenario();
    store.fail_on(StoreOperation::SaveMetadata);
    let mut harness = harness(store);
    let command = command(&[TARGET, SOURCE], MergeOrdering::Chronological, true);

    assert!(harness.merger.execute(&command).is_err());
    harness.merger.store_mut().clear_failures();
    let merged = harness.merger.execute(&command).unwrap();

    assert_eq!(merged.posts.len(), 5);
    assert_eq!(harness.events.events().len(), 1);
}
