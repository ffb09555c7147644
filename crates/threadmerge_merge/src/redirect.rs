//! Redirection records and source cleanup.

use threadmerge_core::{DiscussionId, Redirection};
use threadmerge_error::DatabaseResult;
use threadmerge_interface::DiscussionStore;
use tracing::{debug, instrument};

/// Record a redirection for every source other than `target`, then delete it.
///
/// The redirection is written before the delete in the same transaction, so
/// once committed every stale id resolves even though its row is gone.
///
/// # Errors
///
/// Propagates store failures unchanged.
#[instrument(skip(store, sources), fields(sources = sources.len()))]
pub fn redirect_and_delete<S: DiscussionStore>(
    store: &mut S,
    target: DiscussionId,
    sources: &[DiscussionId],
) -> DatabaseResult<Vec<Redirection>> {
    let mut redirections = Vec::with_capacity(sources.len());
    for source in sources.iter().filter(|source| **source != target) {
        redirections.push(store.insert_redirection(*source, target)?);
        store.delete_discussion(*source)?;
        debug!(%source, %target, "Redirected discussion");
    }
    Ok(redirections)
}
