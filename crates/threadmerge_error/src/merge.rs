//! Merge error types.

/// Phase of the transactional write sequence.
///
/// Every phase has a stable translation key so callers can render a
/// user-facing message without seeing storage internals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum MergeStep {
    /// Closing historic numbering gaps in the target before the merge
    #[display("gap fix")]
    GapFix,
    /// Moving every post to a collision-free high number range
    #[display("park renumber")]
    ParkRenumber,
    /// Compacting parked posts to 1..N
    #[display("compact renumber")]
    CompactRenumber,
    /// Appending incoming posts after the target's last number
    #[display("append renumber")]
    AppendRenumber,
    /// Recomputing denormalized discussion fields
    #[display("metadata refresh")]
    MetadataRefresh,
    /// Moving follower subscriptions to the target
    #[display("subscription migration")]
    SubscriptionMigration,
    /// Recording redirections and deleting merged-away discussions
    #[display("redirection")]
    Redirection,
    /// Committing the transaction
    #[display("commit")]
    Commit,
}

impl MergeStep {
    /// Translation key naming this phase.
    ///
    /// # Examples
    ///
    /// ```
    /// use threadmerge_error::MergeStep;
    ///
    /// assert_eq!(MergeStep::Redirection.message_key(), "threadmerge.merge_failed.redirection");
    /// ```
    pub fn message_key(&self) -> &'static str {
        match self {
            MergeStep::GapFix => "threadmerge.merge_failed.gap_fix",
            MergeStep::ParkRenumber => "threadmerge.merge_failed.park_renumber",
            MergeStep::CompactRenumber => "threadmerge.merge_failed.compact_renumber",
            MergeStep::AppendRenumber => "threadmerge.merge_failed.append_renumber",
            MergeStep::MetadataRefresh => "threadmerge.merge_failed.metadata_refresh",
            MergeStep::SubscriptionMigration => "threadmerge.merge_failed.subscription_migration",
            MergeStep::Redirection => "threadmerge.merge_failed.redirection",
            MergeStep::Commit => "threadmerge.merge_failed.commit",
        }
    }
}

/// Specific merge failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum MergeErrorKind {
    /// A requested discussion does not exist
    #[display("Discussion {} not found", _0)]
    NotFound(i64),
    /// The actor may not merge into the target discussion
    #[display("User {} may not merge discussion {}", actor, discussion)]
    Forbidden {
        /// Acting user id
        actor: i64,
        /// Target discussion id
        discussion: i64,
    },
    /// The mergeability predicate rejected the candidate posts
    #[display("Posts cannot be merged: {}", _0.join("; "))]
    Validation(Vec<String>),
    /// A phase of the transactional write failed and everything was rolled back
    #[display("Merge failed during {}: {}", step, message)]
    MergeFailed {
        /// Phase that failed
        step: MergeStep,
        /// Translated user-facing message
        message: String,
    },
    /// A read outside the write transaction failed
    #[display("Storage failure: {}", _0)]
    Storage(crate::DatabaseErrorKind),
}

/// Merge error with location tracking.
///
/// # Examples
///
/// ```
/// use threadmerge_error::{MergeError, MergeErrorKind};
///
/// let err = MergeError::new(MergeErrorKind::NotFound(7));
/// assert!(format!("{}", err).contains("Discussion 7 not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Merge Error: {} at line {} in {}", kind, line, file)]
pub struct MergeError {
    /// The specific error kind
    pub kind: MergeErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl MergeError {
    /// Create a new merge error with location tracking.
    #[track_caller]
    pub fn new(kind: MergeErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &MergeErrorKind {
        &self.kind
    }

    /// The failed phase, if this error came from the write sequence.
    pub fn step(&self) -> Option<MergeStep> {
        match &self.kind {
            MergeErrorKind::MergeFailed { step, .. } => Some(*step),
            _ => None,
        }
    }
}

impl From<crate::DatabaseError> for MergeError {
    #[track_caller]
    fn from(err: crate::DatabaseError) -> Self {
        MergeError::new(MergeErrorKind::Storage(err.kind))
    }
}

/// Result type for merge operations.
pub type MergeResult<T> = Result<T, MergeError>;
