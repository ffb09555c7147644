//! Configuration and command-line error types.

/// Configuration failure conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ConfigErrorKind {
    /// Sources could not be read or merged into one configuration
    #[display("Failed to build configuration: {}", _0)]
    Build(String),
    /// Merged configuration did not match the expected shape
    #[display("Failed to parse configuration: {}", _0)]
    Parse(String),
    /// Neither `DATABASE_URL` nor `[database] url` is set
    #[display("No database configured: set DATABASE_URL or [database] url")]
    MissingDatabaseUrl,
    /// Command-line arguments did not form a valid merge command
    #[display("Invalid merge command: {}", _0)]
    InvalidCommand(String),
    /// A result could not be rendered for output
    #[display("Failed to render result: {}", _0)]
    Render(String),
}

/// Configuration error with source location.
///
/// # Examples
///
/// ```
/// use threadmerge_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::Parse("unknown ordering 'alpha'".into()));
/// assert!(format!("{}", err).contains("alpha"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// The kind of error that occurred
    pub kind: ConfigErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &ConfigErrorKind {
        &self.kind
    }
}
