//! Store error types.

/// Store error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum DatabaseErrorKind {
    /// Connection failed
    #[display("Database connection error: {}", _0)]
    Connection(String),
    /// Query execution failed
    #[display("Database query error: {}", _0)]
    Query(String),
    /// Two posts claimed the same number in one discussion
    #[display(
        "Unique constraint violated: discussion {} already has post number {}",
        discussion_id,
        number
    )]
    UniqueViolation {
        /// Discussion holding the duplicate number
        discussion_id: i64,
        /// The contested post number
        number: i64,
    },
    /// Any other integrity constraint reported by the store
    #[display("Constraint violated: {}", _0)]
    Constraint(String),
    /// Record not found
    #[display("Record not found")]
    NotFound,
    /// Migration error
    #[display("Migration error: {}", _0)]
    Migration(String),
    /// Transaction could not begin, commit or roll back
    #[display("Transaction error: {}", _0)]
    Transaction(String),
}

/// Store error with source location tracking.
///
/// # Examples
///
/// ```
/// use threadmerge_error::{DatabaseError, DatabaseErrorKind};
///
/// let err = DatabaseError::new(DatabaseErrorKind::NotFound);
/// assert!(format!("{}", err).contains("not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Database Error: {} at line {} in {}", kind, line, file)]
pub struct DatabaseError {
    /// The kind of error that occurred
    pub kind: DatabaseErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl DatabaseError {
    /// Create a new DatabaseError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: DatabaseErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &DatabaseErrorKind {
        &self.kind
    }
}

/// Result type for store operations.
pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(feature = "database")]
impl From<diesel::result::Error> for DatabaseError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind as DieselKind, Error};

        match err {
            Error::NotFound => DatabaseError::new(DatabaseErrorKind::NotFound),
            // Postgres reports the offending values only as message text.
            Error::DatabaseError(DieselKind::UniqueViolation, info) => {
                DatabaseError::new(DatabaseErrorKind::Constraint(info.message().to_string()))
            }
            Error::RollbackTransaction => {
                DatabaseError::new(DatabaseErrorKind::Transaction("rolled back".to_string()))
            }
            _ => DatabaseError::new(DatabaseErrorKind::Query(err.to_string())),
        }
    }
}

#[cfg(feature = "database")]
impl From<diesel::ConnectionError> for DatabaseError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        DatabaseError::new(DatabaseErrorKind::Connection(err.to_string()))
    }
}
