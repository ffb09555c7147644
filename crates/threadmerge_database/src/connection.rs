//! Database connection utilities.

use diesel::pg::PgConnection;
use diesel::prelude::*;
use threadmerge_error::{DatabaseError, DatabaseErrorKind, DatabaseResult};
use tracing::debug;

/// Establish a connection to the PostgreSQL database.
///
/// Reads the `DATABASE_URL` environment variable to determine the connection string.
///
/// # Errors
///
/// Returns an error if:
/// - `DATABASE_URL` environment variable is not set
/// - Connection to the database fails
pub fn establish_connection() -> DatabaseResult<PgConnection> {
    let database_url = std::env::var("DATABASE_URL").map_err(|_| {
        DatabaseError::new(DatabaseErrorKind::Connection(
            "DATABASE_URL environment variable not set".to_string(),
        ))
    })?;

    connect(&database_url)
}

/// Connect to the database at `database_url`.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub fn connect(database_url: &str) -> DatabaseResult<PgConnection> {
    debug!("Connecting to PostgreSQL");
    PgConnection::establish(database_url)
        .map_err(|e| DatabaseError::new(DatabaseErrorKind::Connection(e.to_string())))
}
