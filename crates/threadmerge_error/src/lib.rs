//! Error types for threadmerge.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use threadmerge_error::{ConfigError, ConfigErrorKind, ThreadmergeResult};
//!
//! fn load() -> ThreadmergeResult<String> {
//!     Err(ConfigError::new(ConfigErrorKind::Parse("missing [merge] section".into())))?
//! }
//!
//! assert!(load().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod database;
mod error;
mod merge;

pub use config::{ConfigError, ConfigErrorKind};
pub use database::{DatabaseError, DatabaseErrorKind, DatabaseResult};
pub use error::{ThreadmergeError, ThreadmergeErrorKind, ThreadmergeResult};
pub use merge::{MergeError, MergeErrorKind, MergeResult, MergeStep};
