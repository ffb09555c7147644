//! Mergeability rules for candidate post sets.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use threadmerge_core::Post;
use threadmerge_interface::PostValidator;
use tracing::{debug, instrument};

/// Validation error details.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("{}: {}", field, reason)]
pub struct ValidationError {
    /// Field that failed validation
    pub field: String,
    /// Reason for failure
    pub reason: String,
}

impl ValidationError {
    /// Create a new validation error.
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Limits applied to one merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Largest merged post set
    #[serde(default = "default_max_posts")]
    pub max_posts: usize,

    /// Most discussions contributing posts to one merge
    #[serde(default = "default_max_discussions")]
    pub max_discussions: usize,
}

fn default_max_posts() -> usize {
    10_000
}

fn default_max_discussions() -> usize {
    25
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_posts: default_max_posts(),
            max_discussions: default_max_discussions(),
        }
    }
}

/// Config-driven mergeability predicate.
pub struct MergeValidator {
    config: ValidationConfig,
}

impl MergeValidator {
    /// Create a new validator with the given limits.
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Every rule the post set breaks.
    #[instrument(skip(self, posts), fields(posts = posts.len()))]
    pub fn validate(&self, posts: &[Post]) -> Vec<ValidationError> {
        debug!("Validating candidate posts");
        let mut errors = Vec::new();

        if posts.len() > self.config.max_posts {
            errors.push(ValidationError::new(
                "posts",
                format!(
                    "Merge would hold {} posts (limit {})",
                    posts.len(),
                    self.config.max_posts
                ),
            ));
        }

        let discussions: HashSet<_> = posts.iter().map(|post| post.discussion_id).collect();
        if discussions.len() > self.config.max_discussions {
            errors.push(ValidationError::new(
                "ids",
                format!(
                    "Merge spans {} discussions (limit {})",
                    discussions.len(),
                    self.config.max_discussions
                ),
            ));
        }

        let mut seen = HashSet::new();
        for post in posts {
            if !seen.insert(post.id) {
                errors.push(ValidationError::new(
                    "posts",
                    format!("Post {} appears more than once", post.id),
                ));
            }
            if post.number == 0 {
                errors.push(ValidationError::new(
                    "number",
                    format!("Post {} has no position", post.id),
                ));
            }
        }

        debug!(errors = errors.len(), "Validation complete");
        errors
    }

    /// Get the validation configuration.
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }
}

impl Default for MergeValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

impl PostValidator for MergeValidator {
    fn assert_valid(&self, posts: &[Post]) -> Result<(), Vec<String>> {
        let errors = self.validate(posts);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.iter().map(ToString::to_string).collect())
        }
    }
}
