//! `RocksDB` document storage for labseat.
//!
//! This crate stores the user directory as documents in a `RocksDB` database.
//! The database plays the role of a document database and each collection is
//! a column family; both are created on open when they do not exist yet.
//!
//! # Architecture
//!
//! The storage uses the following collections:
//!
//! - `users` (name configurable): user profiles, keyed by `user_id`
//!
//! # Example
//!
//! ```no_run
//! use labseat_store::{RocksStore, Store};
//!
//! let store = RocksStore::open("/tmp/labseat-db").unwrap();
//!
//! // List every user in the collection
//! let users = store.list_users().unwrap();
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod keys;
pub mod rocks;
pub mod schema;
pub mod types;

pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use rocks::RocksStore;
pub use types::{Gender, Role, User};

use labseat_core::UserId;

/// The storage trait defining all database operations.
///
/// This trait abstracts the storage layer, allowing for different implementations
/// (e.g., `RocksDB`, in-memory for testing).
pub trait Store: Send + Sync {
    /// Insert a new user document.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if a user with the same ID exists.
    fn insert_user(&self, user: &User) -> Result<()>;

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn get_user(&self, user_id: &UserId) -> Result<Option<User>>;

    /// List every user in the collection.
    ///
    /// This is a full collection scan.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    fn list_users(&self) -> Result<Vec<User>>;
}
