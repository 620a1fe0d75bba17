//! Store location configuration.

use std::path::PathBuf;

use crate::error::Result;
use crate::rocks::RocksStore;
use crate::schema::collection;

/// Where the user directory lives.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Database directory.
    pub path: PathBuf,
    /// Column family holding user documents.
    pub users_collection: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/data/labseat"),
            users_collection: collection::USERS.to_string(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from environment variables.
    ///
    /// Supported environment variables:
    /// - `DATA_DIR`: database directory
    /// - `USERS_COLLECTION`: user collection name
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("DATA_DIR") {
            config.path = PathBuf::from(val);
        }
        if let Ok(val) = std::env::var("USERS_COLLECTION") {
            if !val.is_empty() {
                config.users_collection = val;
            }
        }

        config
    }

    /// Open the store this configuration describes.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn open(&self) -> Result<RocksStore> {
        RocksStore::open_with_collection(&self.path, &self.users_collection)
    }
}
