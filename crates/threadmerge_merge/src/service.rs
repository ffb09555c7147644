//! Async wrapper around the orchestrator.

use crate::DiscussionMerger;
use async_trait::async_trait;
use std::sync::Arc;
use threadmerge_core::{MergeCommand, MergedDiscussion};
use threadmerge_error::{DatabaseErrorKind, MergeError, MergeErrorKind, MergeResult};
use threadmerge_interface::{DiscussionMerging, DiscussionStore};
use tokio::sync::Mutex;

/// Runs merges on the blocking thread pool.
///
/// The store connection is exclusive, so concurrent calls queue on the
/// mutex and execute one at a time.
pub struct MergeService<S> {
    merger: Arc<Mutex<DiscussionMerger<S>>>,
}

impl<S> Clone for MergeService<S> {
    fn clone(&self) -> Self {
        Self {
            merger: Arc::clone(&self.merger),
        }
    }
}

impl<S: DiscussionStore + Send + 'static> MergeService<S> {
    /// Wrap an orchestrator.
    pub fn new(merger: DiscussionMerger<S>) -> Self {
        Self {
            merger: Arc::new(Mutex::new(merger)),
        }
    }

    /// Shared handle to the orchestrator, e.g. for inspecting the store.
    pub fn merger(&self) -> Arc<Mutex<DiscussionMerger<S>>> {
        Arc::clone(&self.merger)
    }
}

#[async_trait]
impl<S: DiscussionStore + Send + 'static> DiscussionMerging for MergeService<S> {
    async fn merge(&self, command: MergeCommand) -> MergeResult<MergedDiscussion> {
        let merger = Arc::clone(&self.merger);

        tokio::task::spawn_blocking(move || merger.blocking_lock().execute(&command))
            .await
            .map_err(|e| {
                MergeError::new(MergeErrorKind::Storage(DatabaseErrorKind::Transaction(
                    format!("merge task failed: {}", e),
                )))
            })?
    }
}
