//! PostgreSQL integration for threadmerge.
//!
//! This crate provides the Diesel schema, row models, embedded migrations and
//! a [`DiscussionStore`](threadmerge_interface::DiscussionStore)
//! implementation backed by one PostgreSQL connection.
//!
//! # Example
//!
//! ```rust,ignore
//! use threadmerge_database::{PgDiscussionStore, establish_connection, run_migrations};
//!
//! let mut conn = establish_connection()?;
//! run_migrations(&mut conn)?;
//! let store = PgDiscussionStore::new(conn);
//! ```

#![forbid(unsafe_code)]

mod connection;
mod migrations;
mod models;
mod store;

pub mod schema;

pub use connection::{connect, establish_connection};
pub use migrations::run_migrations;
pub use models::{DiscussionRow, MetadataChangeset, PostRow, RedirectionRow, SubscriptionRow};
pub use store::PgDiscussionStore;
