//! Shared fixtures and fake collaborators for merge tests.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::{Arc, Mutex};
use threadmerge_core::{
    Actor, Discussion, DiscussionId, DiscussionMerged, MergeCommand, MergeOrdering, Post, PostId,
    PostType, UserId,
};
use threadmerge_interface::{
    ExtensionCheck, MergeAuthorizer, MergeEventSink, PostValidator, Translator,
};
use threadmerge_merge::{DiscussionMerger, MergeCollaborators, SUBSCRIPTIONS_EXTENSION};
use threadmerge_storage::InMemoryDiscussionStore;

pub const TARGET: DiscussionId = DiscussionId::new(1);
pub const SOURCE: DiscussionId = DiscussionId::new(2);
pub const OTHER_SOURCE: DiscussionId = DiscussionId::new(3);

pub fn at(minute: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap() + Duration::minutes(minute)
}

pub fn discussion(id: DiscussionId) -> Discussion {
    Discussion {
        id,
        title: format!("Discussion {}", id),
        comment_count: 0,
        participant_count: 0,
        last_post_number: None,
        first_post_id: None,
        last_post_id: None,
        last_posted_at: None,
        created_at: at(0),
    }
}

pub fn comment(id: i64, discussion_id: DiscussionId, number: u32, minute: i64, user: i64) -> Post {
    Post {
        id: PostId::new(id),
        discussion_id,
        number,
        created_at: at(minute),
        user_id: Some(UserId::new(user)),
        post_type: PostType::Comment,
    }
}

pub fn tagged(id: i64, discussion_id: DiscussionId, number: u32, minute: i64) -> Post {
    Post {
        post_type: PostType::DiscussionTagged,
        user_id: None,
        ..comment(id, discussion_id, number, minute, 0)
    }
}

/// Target posts 101..103 at d1 < d2 < d3; source posts 201 at d0 and 202 at d4.
pub fn scenario() -> InMemoryDiscussionStore {
    let mut store = InMemoryDiscussionStore::new();
    store.insert_discussion(discussion(TARGET));
    store.insert_discussion(discussion(SOURCE));
    for post in [
        comment(101, TARGET, 1, 10, 1),
        comment(102, TARGET, 2, 20, 2),
        comment(103, TARGET, 3, 30, 1),
        comment(201, SOURCE, 1, 5, 3),
        comment(202, SOURCE, 2, 40, 2),
    ] {
        store.insert_post(post).unwrap();
    }
    store
}

/// [`scenario`] plus a third discussion with one post at d5.
pub fn three_way_scenario() -> InMemoryDiscussionStore {
    let mut store = scenario();
    store.insert_discussion(discussion(OTHER_SOURCE));
    store.insert_post(comment(301, OTHER_SOURCE, 1, 50, 4)).unwrap();
    store
}

pub fn command(ids: &[DiscussionId], ordering: MergeOrdering, commit: bool) -> MergeCommand {
    MergeCommand::builder()
        .actor(Actor::new(UserId::new(99)))
        .target(TARGET)
        .ids(ids.to_vec())
        .ordering(ordering)
        .commit(commit)
        .build()
        .unwrap()
}

pub fn numbers(posts: &[Post]) -> Vec<(i64, u32)> {
    posts.iter().map(|post| (post.id.get(), post.number)).collect()
}

pub struct AllowAll;

impl MergeAuthorizer for AllowAll {
    fn can_merge(&self, _actor: &Actor, _discussion: &Discussion) -> bool {
        true
    }
}

pub struct DenyAll;

impl MergeAuthorizer for DenyAll {
    fn can_merge(&self, _actor: &Actor, _discussion: &Discussion) -> bool {
        false
    }
}

pub struct AcceptAll;

impl PostValidator for AcceptAll {
    fn assert_valid(&self, _posts: &[Post]) -> Result<(), Vec<String>> {
        Ok(())
    }
}

pub struct RejectPost(pub PostId);

impl PostValidator for RejectPost {
    fn assert_valid(&self, posts: &[Post]) -> Result<(), Vec<String>> {
        if posts.iter().any(|post| post.id == self.0) {
            Err(vec![format!("post {} cannot be moved", self.0)])
        } else {
            Ok(())
        }
    }
}

pub struct Extensions(pub Vec<&'static str>);

impl ExtensionCheck for Extensions {
    fn is_enabled(&self, name: &str) -> bool {
        self.0.contains(&name)
    }
}

pub struct KeyTranslator;

impl Translator for KeyTranslator {
    fn translate(&self, key: &str) -> String {
        format!("translated:{}", key)
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<DiscussionMerged>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<DiscussionMerged> {
        self.events.lock().unwrap().clone()
    }
}

impl MergeEventSink for RecordingSink {
    fn discussion_merged(&self, event: &DiscussionMerged) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub struct Harness {
    pub merger: DiscussionMerger<InMemoryDiscussionStore>,
    pub events: Arc<RecordingSink>,
}

pub fn collaborators(
    authorizer: Arc<dyn MergeAuthorizer>,
    validator: Arc<dyn PostValidator>,
    extensions: Vec<&'static str>,
) -> (MergeCollaborators, Arc<RecordingSink>) {
    let events = Arc::new(RecordingSink::default());
    let collaborators = MergeCollaborators {
        authorizer,
        validator,
        extensions: Arc::new(Extensions(extensions)),
        translator: Arc::new(KeyTranslator),
        events: events.clone(),
    };
    (collaborators, events)
}

pub fn harness(store: InMemoryDiscussionStore) -> Harness {
    harness_with(store, Arc::new(AllowAll), Arc::new(AcceptAll))
}

pub fn harness_with(
    store: InMemoryDiscussionStore,
    authorizer: Arc<dyn MergeAuthorizer>,
    validator: Arc<dyn PostValidator>,
) -> Harness {
    let (collaborators, events) =
        collaborators(authorizer, validator, vec![SUBSCRIPTIONS_EXTENSION]);
    Harness {
        merger: DiscussionMerger::new(store, collaborators),
        events,
    }
}
