//! Default collaborators built from configuration.

use crate::ThreadmergeConfig;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use threadmerge_core::DiscussionMerged;
use threadmerge_interface::{ExtensionCheck, MergeEventSink, Translator};
use threadmerge_merge::MergeCollaborators;
use threadmerge_security::{MergeValidator, PermissionChecker};
use tracing::info;

/// Translator backed by the `[messages]` catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogTranslator {
    messages: HashMap<String, String>,
}

impl CatalogTranslator {
    /// Create a translator over a key → text catalog.
    pub fn new(messages: HashMap<String, String>) -> Self {
        Self { messages }
    }
}

impl Translator for CatalogTranslator {
    fn translate(&self, key: &str) -> String {
        self.messages
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_string())
    }
}

/// Extension flags from `[merge] enabled_extensions`.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredExtensions {
    enabled: HashSet<String>,
}

impl ConfiguredExtensions {
    /// Enable exactly the named extensions.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl ExtensionCheck for ConfiguredExtensions {
    fn is_enabled(&self, name: &str) -> bool {
        self.enabled.contains(name)
    }
}

/// Event sink that logs each committed merge.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl MergeEventSink for TracingEventSink {
    fn discussion_merged(&self, event: &DiscussionMerged) {
        let sources: Vec<i64> = event
            .source_discussions
            .iter()
            .map(|discussion| discussion.id.get())
            .collect();
        info!(
            actor = %event.actor.id,
            target = %event.discussion.id,
            sources = ?sources,
            posts = event.posts.len(),
            "Discussion merged"
        );
    }
}

/// Build the collaborator set described by `config`.
pub fn collaborators_from_config(config: &ThreadmergeConfig) -> MergeCollaborators {
    MergeCollaborators {
        authorizer: Arc::new(PermissionChecker::new(config.permissions.clone())),
        validator: Arc::new(MergeValidator::new(config.validation.clone())),
        extensions: Arc::new(ConfiguredExtensions::new(
            config.merge.enabled_extensions.iter().cloned(),
        )),
        translator: Arc::new(CatalogTranslator::new(config.messages.clone())),
        events: Arc::new(TracingEventSink),
    }
}
