//! Database command handlers.

use threadmerge::{
    ConfigError, ConfigErrorKind, DiscussionId, DiscussionStore, PgDiscussionStore, ThreadmergeConfig,
    ThreadmergeResult, connect, run_migrations,
};
use tracing::{info, instrument};

/// Connect to the configured database.
pub fn open_store(config: &ThreadmergeConfig) -> ThreadmergeResult<PgDiscussionStore> {
    let url = config
        .database_url()
        .ok_or_else(|| ConfigError::new(ConfigErrorKind::MissingDatabaseUrl))?;
    Ok(PgDiscussionStore::new(connect(&url)?))
}

/// Apply pending migrations.
#[instrument(skip(config))]
pub fn run_migrate(config: &ThreadmergeConfig) -> ThreadmergeResult<()> {
    let mut store = open_store(config)?;
    let applied = run_migrations(store.connection())?;
    if applied.is_empty() {
        println!("Database is up to date");
    }
    for version in applied {
        info!(%version, "Migration applied");
        println!("Applied {}", version);
    }
    Ok(())
}

/// Print where discussion `id` lives now.
#[instrument(skip(config))]
pub fn resolve_discussion(config: &ThreadmergeConfig, id: i64) -> ThreadmergeResult<()> {
    let mut store = open_store(config)?;
    let resolved = store.resolve_redirection(DiscussionId::new(id))?;
    let exists = store.find_discussion(resolved)?.is_some();
    println!(
        "{}",
        serde_json::json!({
            "requested": id,
            "resolved": resolved,
            "exists": exists,
        })
    );
    Ok(())
}
