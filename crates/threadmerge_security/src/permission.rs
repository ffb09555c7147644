//! Permission model for merges.

use crate::{SecurityError, SecurityErrorKind, SecurityResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use threadmerge_core::{Actor, Discussion};
use threadmerge_interface::MergeAuthorizer;
use tracing::{debug, instrument};

/// Who may merge what.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PermissionConfig {
    /// Users allowed to merge into any discussion not denied
    #[serde(default)]
    pub moderators: HashSet<i64>,

    /// Discussions that can never be merge targets (takes precedence)
    #[serde(default)]
    pub denied_discussions: HashSet<i64>,

    /// Whether every user may merge by default
    #[serde(default)]
    pub allow_all_by_default: bool,
}

/// Permission checker for merge requests.
pub struct PermissionChecker {
    config: PermissionConfig,
}

impl PermissionChecker {
    /// Create a new permission checker with the given configuration.
    pub fn new(config: PermissionConfig) -> Self {
        Self { config }
    }

    /// Check whether `actor` may merge into `target`.
    #[instrument(skip(self, actor, target), fields(actor = %actor.id, target = %target.id))]
    pub fn check_merge(&self, actor: &Actor, target: &Discussion) -> SecurityResult<()> {
        debug!("Checking merge permission");

        let denied = |reason: &str| {
            SecurityError::new(SecurityErrorKind::PermissionDenied {
                actor: actor.id.get(),
                discussion: target.id.get(),
                reason: reason.to_string(),
            })
        };

        // Deny list takes precedence
        if self.config.denied_discussions.contains(&target.id.get()) {
            debug!("Discussion explicitly denied");
            return Err(denied("Discussion is in deny list"));
        }

        let allowed =
            self.config.moderators.contains(&actor.id.get()) || self.config.allow_all_by_default;

        if !allowed {
            debug!("Actor is not a moderator");
            return Err(denied("User is not a moderator"));
        }

        debug!("Merge permitted");
        Ok(())
    }

    /// Get the permission configuration.
    pub fn config(&self) -> &PermissionConfig {
        &self.config
    }
}

impl MergeAuthorizer for PermissionChecker {
    fn can_merge(&self, actor: &Actor, discussion: &Discussion) -> bool {
        match self.check_merge(actor, discussion) {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "Merge not authorized");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use threadmerge_core::{DiscussionId, UserId};

    fn discussion(id: i64) -> Discussion {
        Discussion {
            id: DiscussionId::new(id),
            title: "Test".to_string(),
            comment_count: 0,
            participant_count: 0,
            last_post_number: None,
            first_post_id: None,
            last_post_id: None,
            last_posted_at: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    fn create_test_config() -> PermissionConfig {
        let mut config = PermissionConfig::default();
        config.moderators.insert(1);
        config.denied_discussions.insert(13);
        config
    }

    #[test]
    fn test_moderator_may_merge() {
        let checker = PermissionChecker::new(create_test_config());
        assert!(checker.can_merge(&Actor::new(UserId::new(1)), &discussion(5)));
    }

    #[test]
    fn test_regular_user_is_denied() {
        let checker = PermissionChecker::new(create_test_config());
        let err = checker
            .check_merge(&Actor::new(UserId::new(2)), &discussion(5))
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            SecurityErrorKind::PermissionDenied { actor: 2, discussion: 5, .. }
        ));
    }

    #[test]
    fn test_deny_list_beats_moderator() {
        let checker = PermissionChecker::new(create_test_config());
        assert!(!checker.can_merge(&Actor::new(UserId::new(1)), &discussion(13)));
    }

    #[test]
    fn test_denials_name_their_cause() {
        let checker = PermissionChecker::new(create_test_config());
        let reason = |actor: i64, target: i64| {
            match checker
                .check_merge(&Actor::new(UserId::new(actor)), &discussion(target))
                .unwrap_err()
                .kind()
            {
                SecurityErrorKind::PermissionDenied { reason, .. } => reason.clone(),
            }
        };

        assert_eq!(reason(1, 13), "Discussion is in deny list");
        assert_eq!(reason(2, 5), "User is not a moderator");
        assert!(!checker.can_merge(&Actor::new(UserId::new(2)), &discussion(5)));
    }

    #[test]
    fn test_allow_all_by_default() {
        let mut config = create_test_config();
        config.allow_all_by_default = true;
        let checker = PermissionChecker::new(config);

        assert!(checker.can_merge(&Actor::new(UserId::new(42)), &discussion(5)));
        assert!(!checker.can_merge(&Actor::new(UserId::new(42)), &discussion(13)));
    }

    #[test]
    fn test_config_from_toml() {
        let config: PermissionConfig = toml::from_str(
            r#"
            moderators = [1, 2]
            denied_discussions = [99]
            "#,
        )
        .unwrap();

        assert_eq!(config.moderators.len(), 2);
        assert!(config.denied_discussions.contains(&99));
        assert!(!config.allow_all_by_default);
    }
}
