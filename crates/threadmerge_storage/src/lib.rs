//! In-memory discussion store for threadmerge.
//!
//! [`InMemoryDiscussionStore`] implements the full
//! [`DiscussionStore`](threadmerge_interface::DiscussionStore) contract
//! without a database:
//!
//! - **Snapshot transactions**: state is cloned on begin and restored on error
//! - **Uniqueness**: every post placement is checked against `(discussion_id, number)`
//! - **Cascades**: deleting a discussion removes its posts and subscription rows
//! - **Fault injection**: any operation can be made to fail, for rollback tests
//!
//! # Example
//!
//! ```rust
//! use threadmerge_interface::DiscussionStore;
//! use threadmerge_storage::InMemoryDiscussionStore;
//! use threadmerge_core::DiscussionId;
//!
//! let mut store = InMemoryDiscussionStore::new();
//! assert!(store.find_discussion(DiscussionId::new(1)).unwrap().is_none());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod memory;

pub use memory::{InMemoryDiscussionStore, StoreOperation};
