//! Database schema definitions and collections.
//!
//! Each document collection is a `RocksDB` column family. Collections are
//! created on open when they do not exist yet.

/// Default collection names.
pub mod collection {
    /// User profiles, keyed by `user_id`.
    pub const USERS: &str = "users";
}

/// Returns the column families to open: every family already present in the
/// database plus the user collection.
///
/// `RocksDB` refuses to open a database unless all existing families are
/// listed, so switching the collection name keeps older collections readable.
#[must_use]
pub fn column_families(existing: Vec<String>, users: &str) -> Vec<String> {
    let mut families = existing;
    if !families.iter().any(|name| name == users) {
        families.push(users.to_string());
    }
    families
}
