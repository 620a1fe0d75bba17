//! Key encoding utilities for `RocksDB`.
//!
//! Documents are partitioned by their ID: the key is the raw UUID bytes, so a
//! full scan returns users in key order.

use labseat_core::UserId;

/// Encode a user key (just the UUID bytes).
#[must_use]
pub fn user_key(user_id: &UserId) -> Vec<u8> {
    user_id.as_bytes().to_vec()
}
