//! `RocksDB` storage implementation.
//!
//! This module provides the `RocksStore` implementation of the `Store` trait.

use std::path::Path;
use std::sync::Arc;

use labseat_core::UserId;
use parking_lot::Mutex;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, IteratorMode, MultiThreaded,
    Options,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{collection, column_families};
use crate::types::User;
use crate::Store;

/// RocksDB-backed document storage.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    users: String,
    // Serializes insert-if-absent so two inserts of one id cannot both win.
    insert_lock: Mutex<()>,
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path, using the
    /// default user collection name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_collection(path, collection::USERS)
    }

    /// Open or create a `RocksDB` database at the given path with a named
    /// user collection. Both the database and the collection are created when
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open_with_collection<P: AsRef<Path>>(path: P, users: &str) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        // Fails when the database does not exist yet; nothing to preserve then.
        let existing = DBWithThreadMode::<MultiThreaded>::list_cf(&opts, path.as_ref())
            .unwrap_or_default();

        let cf_descriptors: Vec<_> = column_families(existing, users)
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path.as_ref(), cf_descriptors)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        tracing::debug!(
            path = %path.as_ref().display(),
            collection = %users,
            "Opened document store"
        );

        Ok(Self {
            db: Arc::new(db),
            users: users.to_string(),
            insert_lock: Mutex::new(()),
        })
    }

    /// Name of the user collection.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.users
    }

    /// Get the user collection handle.
    fn cf(&self) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(&self.users)
            .ok_or_else(|| StoreError::Database(format!("collection not found: {}", self.users)))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

impl Store for RocksStore {
    fn insert_user(&self, user: &User) -> Result<()> {
        let cf = self.cf()?;
        let key = keys::user_key(&user.id);
        let value = Self::serialize(user)?;

        let _guard = self.insert_lock.lock();

        let exists = self
            .db
            .get_pinned_cf(&cf, &key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .is_some();
        if exists {
            return Err(StoreError::Conflict);
        }

        self.db
            .put_cf(&cf, key, value)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn get_user(&self, user_id: &UserId) -> Result<Option<User>> {
        let cf = self.cf()?;
        let key = keys::user_key(user_id);

        self.db
            .get_cf(&cf, key)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let cf = self.cf()?;

        let mut users = Vec::new();
        let iter = self.db.iterator_cf(&cf, IteratorMode::Start);

        for item in iter {
            let (_, value) = item.map_err(|e| StoreError::Database(e.to_string()))?;
            let user: User = Self::deserialize(&value)?;
            users.push(user);
        }

        Ok(users)
    }
}
