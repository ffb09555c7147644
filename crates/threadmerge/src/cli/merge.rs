//! Merge command handler.

use super::{MergeArgs, open_store};
use threadmerge::{
    Actor, ConfigError, ConfigErrorKind, DiscussionId, DiscussionMerger, DiscussionMerging,
    MergeCommand, MergeService, ThreadmergeConfig, ThreadmergeResult, UserId,
    collaborators_from_config,
};
use tracing::{debug, instrument};

/// Run a merge (or its projection) and print the resulting discussion as JSON.
#[instrument(skip(config, args), fields(target = args.target, commit = args.commit))]
pub async fn run_merge(config: &ThreadmergeConfig, args: MergeArgs) -> ThreadmergeResult<()> {
    let ordering = args.ordering.unwrap_or(config.merge.default_ordering);
    debug!(%ordering, ids = ?args.ids, "Building merge command");

    let command = MergeCommand::builder()
        .actor(Actor::new(UserId::new(args.actor)))
        .target(DiscussionId::new(args.target))
        .ids(args.ids.into_iter().map(DiscussionId::new).collect::<Vec<_>>())
        .ordering(ordering)
        .commit(args.commit)
        .build()
        .map_err(|e| ConfigError::new(ConfigErrorKind::InvalidCommand(e.to_string())))?;

    let store = open_store(config)?;
    let service = MergeService::new(DiscussionMerger::new(
        store,
        collaborators_from_config(config),
    ));
    let merged = service.merge(command).await?;

    let output = serde_json::to_string_pretty(&merged)
        .map_err(|e| ConfigError::new(ConfigErrorKind::Render(e.to_string())))?;
    println!("{}", output);
    if !args.commit {
        println!("Dry run: nothing was written. Pass --commit to merge.");
    }
    Ok(())
}
