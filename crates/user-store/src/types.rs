//! Stored record types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user row.
///
/// Created exactly once by a successful registration, never mutated
/// afterwards. `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRecord {
    /// Store-assigned rowid, strictly increasing, never reused
    pub id: i64,

    /// Unique across all live records, case-sensitive
    pub username: String,

    /// Client-generated salt (16 bytes)
    pub salt: Vec<u8>,

    /// Client public signing key (32 bytes)
    pub signing_key: Vec<u8>,

    /// Client public encryption key (32 bytes)
    pub encryption_key: Vec<u8>,

    /// Insertion time, defaulted by the store
    pub created_at: DateTime<Utc>,
}
