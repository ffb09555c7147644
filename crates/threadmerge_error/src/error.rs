//! Top-level error wrapper types.

use crate::{ConfigError, DatabaseError, MergeError};

/// Every error a threadmerge operation can raise.
///
/// # Examples
///
/// ```
/// use threadmerge_error::{ConfigError, ConfigErrorKind, ThreadmergeError};
///
/// let err: ThreadmergeError = ConfigError::new(ConfigErrorKind::MissingDatabaseUrl).into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum ThreadmergeErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Store error
    #[from(DatabaseError)]
    Database(DatabaseError),
    /// Merge error
    #[from(MergeError)]
    Merge(MergeError),
}

/// Threadmerge error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Threadmerge Error: {}", _0)]
pub struct ThreadmergeError(Box<ThreadmergeErrorKind>);

impl ThreadmergeError {
    /// Create a new error from a kind.
    pub fn new(kind: ThreadmergeErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ThreadmergeErrorKind {
        &self.0
    }
}

impl<T> From<T> for ThreadmergeError
where
    T: Into<ThreadmergeErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for threadmerge operations.
pub type ThreadmergeResult<T> = std::result::Result<T, ThreadmergeError>;
