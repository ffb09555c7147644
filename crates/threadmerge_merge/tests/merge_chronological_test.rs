//! Chronological ("date") merges.

mod common;

use common::*;
use threadmerge_core::{MergeOrdering, PostId};
use threadmerge_interface::DiscussionStore;
use threadmerge_storage::InMemoryDiscussionStore;

#[test]
fn test_interleaves_posts_by_date() {
    let mut harness = harness(scenario());

    let merged = harness
        .merger
        .execute(&command(&[TARGET, SOURCE], MergeOrdering::Chronological, true))
        .unwrap();

    let expected = vec![(201, 1), (101, 2), (102, 3), (103, 4), (202, 5)];
    assert_eq!(numbers(&merged.posts), expected);

    let store = harness.merger.store();
    assert_eq!(numbers(&store.posts_of(TARGET)), expected);
    assert!(store.posts_of(TARGET).iter().all(|post| post.discussion_id == TARGET));
}

#[test]
fn test_refreshes_target_metadata() {
    let mut harness = harness(scenario());

    let merged = harness
        .merger
        .execute(&command(&[TARGET, SOURCE], MergeOrdering::Chronological, true))
        .unwrap();

    let stored = harness.merger.store().discussion(TARGET).unwrap().clone();
    assert_eq!(stored, merged.discussion);
    assert_eq!(stored.comment_count, 5);
    assert_eq!(stored.participant_count, 3);
    assert_eq!(stored.first_post_id, Some(PostId::new(201)));
    assert_eq!(stored.last_post_id, Some(PostId::new(202)));
    assert_eq!(stored.last_post_number, Some(5));
    assert_eq!(stored.last_posted_at, Some(at(40)));
}

#[test]
fn test_sources_are_redirected_and_deleted() {
    let mut harness = harness(three_way_scenario());

    harness
        .merger
        .execute(&command(
            &[TARGET, SOURCE, OTHER_SOURCE],
            MergeOrdering::Chronological,
            true,
        ))
        .unwrap();

    let store = harness.merger.store_mut();
    assert!(store.discussion(TARGET).is_some());
    assert!(store.discussion(SOURCE).is_none());
    assert!(store.discussion(OTHER_SOURCE).is_none());

    let redirections = store.redirections();
    assert_eq!(redirections.len(), 2);
    assert!(redirections.iter().all(|r| r.new_discussion_id == TARGET));
    assert_eq!(store.resolve_redirection(SOURCE).unwrap(), TARGET);
    assert_eq!(store.resolve_redirection(OTHER_SOURCE).unwrap(), TARGET);
    assert_eq!(store.resolve_redirection(TARGET).unwrap(), TARGET);
}

#[test]
fn test_emits_one_event_after_commit() {
    let mut harness = harness(scenario());

    let merged = harness
        .merger
        .execute(&command(&[TARGET, SOURCE], MergeOrdering::Chronological, true))
        .unwrap();

    let events = harness.events.events();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.discussion, merged.discussion);
    assert_eq!(event.posts, merged.posts);
    assert_eq!(event.source_discussions.len(), 1);
    assert_eq!(event.source_discussions[0].id, SOURCE);
    assert_eq!(event.actor.id.get(), 99);
}

#[test]
fn test_target_omitted_from_ids_is_still_merged_into() {
    let mut harness = harness(scenario());

    let merged = harness
        .merger
        .execute(&command(&[SOURCE], MergeOrdering::Chronological, true))
        .unwrap();

    assert_eq!(merged.posts.len(), 5);
    assert!(harness.merger.store().discussion(TARGET).is_some());
}

#[test]
fn test_gap_fix_runs_before_merge() {
    let mut store = InMemoryDiscussionStore::new();
    store.insert_discussion(discussion(TARGET));
    store.insert_discussion(discussion(SOURCE));
    for post in [
        comment(101, TARGET, 1, 10, 1),
        comment(102, TARGET, 3, 20, 1),
        comment(103, TARGET, 4, 30, 1),
        comment(201, SOURCE, 1, 25, 2),
    ] {
        store.insert_post(post).unwrap();
    }
    let mut harness = harness(store);

    let merged = harness
        .merger
        .execute(&command(&[TARGET, SOURCE], MergeOrdering::Chronological, true))
        .unwrap();

    assert_eq!(
        numbers(&merged.posts),
        vec![(101, 1), (102, 2), (201, 3), (103, 4)]
    );
    assert_eq!(merged.discussion.last_post_number, Some(4));
}

#[test]
fn test_rejected_merge_leaves_gapped_target_alone() {
    let mut store = InMemoryDiscussionStore::new();
    store.insert_discussion(discussion(TARGET));
    store.insert_discussion(discussion(SOURCE));
    store.insert_post(comment(101, TARGET, 1, 10, 1)).unwrap();
    store.insert_post(comment(102, TARGET, 4, 20, 1)).unwrap();
    store.insert_post(comment(201, SOURCE, 1, 5, 2)).unwrap();
    let mut harness = harness_with(
        store,
        std::sync::Arc::new(AllowAll),
        std::sync::Arc::new(RejectPost(PostId::new(201))),
    );

    let result =
        harness
            .merger
            .execute(&command(&[TARGET, SOURCE], MergeOrdering::Chronological, true));

    assert!(result.is_err());
    let store = harness.merger.store();
    assert_eq!(numbers(&store.posts_of(TARGET)), vec![(101, 1), (102, 4)]);
    assert_eq!(store.commits(), 0);
    assert!(store.discussion(SOURCE).is_some());
}

#[test]
fn test_target_housekeeping_posts_keep_their_place() {
    let mut store = scenario();
    store.insert_post(tagged(104, TARGET, 4, 35)).unwrap();
    store.insert_post(tagged(203, SOURCE, 3, 45)).unwrap();
    let mut harness = harness(store);

    let merged = harness
        .merger
        .execute(&command(&[TARGET, SOURCE], MergeOrdering::Chronological, true))
        .unwrap();

    assert_eq!(
        numbers(&merged.posts),
        vec![(201, 1), (101, 2), (102, 3), (103, 4), (104, 5), (202, 6)]
    );
    assert_eq!(merged.discussion.comment_count, 5);
    // The source's own tag event went away with the source.
    assert!(harness.merger.store().post(PostId::new(203)).is_none());
}

#[test]
fn test_remerging_a_merged_discussion_is_a_no_op_on_numbers() {
    let mut harness = harness(scenario());
    let first = harness
        .merger
        .execute(&command(&[TARGET, SOURCE], MergeOrdering::Chronological, true))
        .unwrap();

    let second = harness
        .merger
        .execute(&command(&[TARGET], MergeOrdering::Chronological, true))
        .unwrap();

    assert_eq!(numbers(&first.posts), numbers(&second.posts));
}
