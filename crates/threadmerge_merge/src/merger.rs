//! Merge orchestrator.

use crate::plan::MergePlan;
use crate::redirect::redirect_and_delete;
use crate::refresh::{refresh_discussion, summarize};
use crate::renumber;
use crate::subscriptions::migrate_subscriptions;
use std::sync::Arc;
use threadmerge_core::{
    Discussion, DiscussionId, DiscussionMerged, MergeCommand, MergeOrdering, MergeStep,
    MergedDiscussion,
};
use threadmerge_error::{DatabaseError, DatabaseResult, MergeError, MergeErrorKind, MergeResult};
use threadmerge_interface::{
    DiscussionStore, ExtensionCheck, MergeAuthorizer, MergeEventSink, PostValidator, Translator,
};
use tracing::{debug, error, info, instrument};

/// Extension name gating follower migration.
pub const SUBSCRIPTIONS_EXTENSION: &str = "subscriptions";

/// Services the orchestrator consults but does not own.
#[derive(Clone)]
pub struct MergeCollaborators {
    /// Decides whether the actor may merge into the target
    pub authorizer: Arc<dyn MergeAuthorizer>,
    /// Mergeability predicate for the candidate posts
    pub validator: Arc<dyn PostValidator>,
    /// Feature flags
    pub extensions: Arc<dyn ExtensionCheck>,
    /// Renders user-facing failure messages
    pub translator: Arc<dyn Translator>,
    /// Receives the post-commit event
    pub events: Arc<dyn MergeEventSink>,
}

impl MergeCollaborators {
    /// Log the low-level cause, then replace it with the phase-level error
    /// callers are allowed to see.
    fn step_failed(&self, step: MergeStep, cause: impl std::fmt::Display) -> MergeError {
        error!(%step, error = %cause, "Merge step failed, rolling back");
        MergeError::new(MergeErrorKind::MergeFailed {
            step,
            message: self.translator.translate(step.message_key()),
        })
    }

    /// Errors escaping a transaction without a phase attached come from
    /// begin or commit.
    fn commit_failed(&self, err: MergeError) -> MergeError {
        match &err.kind {
            MergeErrorKind::Storage(kind) => self.step_failed(MergeStep::Commit, kind),
            _ => err,
        }
    }
}

/// Drives a merge from command to committed transaction.
///
/// The orchestrator owns its store; every structural write of one command
/// happens inside a single store transaction, so readers observe either the
/// state before the merge or the state after it.
pub struct DiscussionMerger<S> {
    store: S,
    collaborators: MergeCollaborators,
}

impl<S: DiscussionStore> DiscussionMerger<S> {
    /// Create an orchestrator over `store`.
    pub fn new(store: S, collaborators: MergeCollaborators) -> Self {
        Self {
            store,
            collaborators,
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The underlying store, mutably.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Give the store back.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Execute a merge command.
    ///
    /// With `commit == false` nothing is written and the projected target is
    /// returned. The projection is best-effort: a concurrent merge landing
    /// before a later commit can change the outcome.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the target or any requested discussion is missing
    /// - `Forbidden` if the authorizer rejects the actor
    /// - `Validation` if the predicate rejects the candidate posts
    /// - `MergeFailed` if any write phase fails; the store is then unchanged
    /// - `Storage` if a read before the write transaction fails
    #[instrument(
        skip(self, command),
        fields(
            target = %command.target,
            actor = %command.actor.id,
            ordering = %command.ordering,
            commit = command.commit
        )
    )]
    pub fn execute(&mut self, command: &MergeCommand) -> MergeResult<MergedDiscussion> {
        let target = self
            .store
            .find_discussion(command.target)?
            .ok_or_else(|| MergeError::new(MergeErrorKind::NotFound(command.target.get())))?;

        if !self.collaborators.authorizer.can_merge(&command.actor, &target) {
            debug!("Actor lacks merge capability");
            return Err(MergeError::new(MergeErrorKind::Forbidden {
                actor: command.actor.id.get(),
                discussion: target.id.get(),
            }));
        }

        let ids = command.discussion_ids();
        let discussions = self.load_discussions(&ids)?;
        let posts = self.store.posts_in(&ids)?;
        let plan = MergePlan::new(target.id, &ids, posts);

        self.collaborators
            .validator
            .assert_valid(&plan.candidates())
            .map_err(|reasons| MergeError::new(MergeErrorKind::Validation(reasons)))?;

        if !command.commit {
            let posts = plan.renumber(command.ordering);
            let mut discussion = target;
            discussion.apply_metadata(&summarize(&posts));
            debug!(posts = posts.len(), "Computed merge projection");
            return Ok(MergedDiscussion { discussion, posts });
        }

        let sources: Vec<Discussion> = discussions
            .into_iter()
            .filter(|discussion| discussion.id != target.id)
            .collect();
        let merged = self.commit(command, &plan)?;

        info!(
            sources = sources.len(),
            posts = merged.posts.len(),
            comment_count = merged.discussion.comment_count,
            "Merged discussions"
        );

        self.collaborators.events.discussion_merged(&DiscussionMerged {
            actor: command.actor.clone(),
            posts: merged.posts.clone(),
            discussion: merged.discussion.clone(),
            source_discussions: sources,
        });

        Ok(merged)
    }

    /// Load `ids` in the given order, failing on the first missing one.
    fn load_discussions(&mut self, ids: &[DiscussionId]) -> MergeResult<Vec<Discussion>> {
        let mut found = self.store.find_discussions(ids)?;
        let mut ordered = Vec::with_capacity(ids.len());
        for id in ids {
            let position = found
                .iter()
                .position(|discussion| discussion.id == *id)
                .ok_or_else(|| MergeError::new(MergeErrorKind::NotFound(id.get())))?;
            ordered.push(found.swap_remove(position));
        }
        Ok(ordered)
    }

    /// The transactional write sequence.
    fn commit(&mut self, command: &MergeCommand, plan: &MergePlan) -> MergeResult<MergedDiscussion> {
        let collaborators = &self.collaborators;
        let target = plan.target();
        let sources = command.source_ids();
        let migrate = collaborators.extensions.is_enabled(SUBSCRIPTIONS_EXTENSION);

        self.store
            .transaction(|store| -> MergeResult<MergedDiscussion> {
                let fail = |step: MergeStep| move |e: DatabaseError| collaborators.step_failed(step, e);

                match command.ordering {
                    MergeOrdering::Chronological => {
                        close_gaps(store, target).map_err(fail(MergeStep::GapFix))?;
                        store
                            .place_posts(&renumber::placements(&plan.parked()))
                            .map_err(fail(MergeStep::ParkRenumber))?;
                        let parked = store
                            .posts_in(&[target])
                            .map_err(fail(MergeStep::CompactRenumber))?;
                        let compacted = renumber::chronological(target, &parked, &[], 0);
                        store
                            .place_posts(&renumber::placements(&compacted))
                            .map_err(fail(MergeStep::CompactRenumber))?;
                    }
                    MergeOrdering::Append => {
                        let appended = plan.renumber(MergeOrdering::Append);
                        store
                            .place_posts(&renumber::changed_placements(&plan.current(), &appended))
                            .map_err(fail(MergeStep::AppendRenumber))?;
                    }
                }

                let merged =
                    refresh_discussion(store, target).map_err(fail(MergeStep::MetadataRefresh))?;

                if migrate {
                    migrate_subscriptions(
                        store,
                        target,
                        &sources,
                        merged.discussion.last_post_number,
                    )
                    .map_err(fail(MergeStep::SubscriptionMigration))?;
                } else {
                    debug!("Subscription migration disabled");
                }

                redirect_and_delete(store, target, &sources)
                    .map_err(fail(MergeStep::Redirection))?;

                Ok(merged)
            })
            .map_err(|e| collaborators.commit_failed(e))
    }
}

/// Close numbering holes left in the target by deleted posts.
///
/// A contiguous target is left untouched. The plan's park offset sits above
/// the pre-fix numbers, so parking afterwards cannot collide.
fn close_gaps<S: DiscussionStore>(store: &mut S, target: DiscussionId) -> DatabaseResult<()> {
    let posts = store.posts_in(&[target])?;
    let Some(fixed) = renumber::fix_gaps(&posts) else {
        return Ok(());
    };
    debug!(posts = posts.len(), "Closing numbering gaps in target");

    let offset = renumber::park_offset(&posts, &[]);
    let parked = renumber::chronological(target, &posts, &[], offset);
    store.place_posts(&renumber::placements(&parked))?;
    store.place_posts(&renumber::placements(&fixed))
}
