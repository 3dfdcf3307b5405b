//! SQLite-backed user store.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::Connection;
use tracing::info;

use crate::error::StoreError;
use crate::types::UserRecord;

/// SQLite-backed user store.
///
/// The connection sits behind a `Mutex`, so each call is individually
/// atomic. No multi-statement transaction is needed: the UNIQUE constraint
/// on `username` alone prevents duplicate reservations, even when an
/// existence pre-check and an insert from two concurrent callers interleave.
pub struct UserStore {
    conn: Mutex<Connection>,
}

impl UserStore {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        info!("User store initialized");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".into()))
    }

    /// Check whether a username is already registered. Case-sensitive
    /// exact match. Best-effort only: the insert is the authority.
    pub fn user_exists(&self, username: &str) -> Result<bool, StoreError> {
        let conn = self.lock()?;
        let exists = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)",
            [username],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    /// Insert a new user, returning the stored row.
    ///
    /// Fails with [`StoreError::DuplicateUsername`] if the username is
    /// already taken at the moment of insertion.
    pub fn add_user(
        &self,
        username: &str,
        salt: &[u8],
        signing_key: &[u8],
        encryption_key: &[u8],
    ) -> Result<UserRecord, StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO users (username, salt, signing_key, encryption_key) \
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![username, salt, signing_key, encryption_key],
        )?;

        let id = conn.last_insert_rowid();
        let record = conn.query_row(
            "SELECT id, username, salt, signing_key, encryption_key, created_at \
             FROM users WHERE id = ?1",
            [id],
            |row| {
                Ok(UserRecord {
                    id: row.get(0)?,
                    username: row.get(1)?,
                    salt: row.get(2)?,
                    signing_key: row.get(3)?,
                    encryption_key: row.get(4)?,
                    created_at: row.get(5)?,
                })
            },
        )?;
        Ok(record)
    }

    /// Number of registered users.
    pub fn user_count(&self) -> Result<u64, StoreError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

/// Apply the schema. Idempotent: re-initializing an existing database is
/// a no-op.
fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            salt BLOB NOT NULL,
            signing_key BLOB NOT NULL,
            encryption_key BLOB NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fields() -> (Vec<u8>, Vec<u8>, Vec<u8>) {
        (vec![0u8; 16], vec![1u8; 32], vec![2u8; 32])
    }

    #[test]
    fn test_exists_and_insert() {
        let store = UserStore::in_memory().unwrap();
        let (salt, sig, enc) = sample_fields();

        assert!(!store.user_exists("alice").unwrap());

        let record = store.add_user("alice", &salt, &sig, &enc).unwrap();
        assert_eq!(record.username, "alice");
        assert_eq!(record.salt, salt);
        assert_eq!(record.signing_key, sig);
        assert_eq!(record.encryption_key, enc);

        assert!(store.user_exists("alice").unwrap());
        // Case-sensitive exact match
        assert!(!store.user_exists("Alice").unwrap());
    }

    #[test]
    fn test_duplicate_username_rejected() {
        let store = UserStore::in_memory().unwrap();
        let (salt, sig, enc) = sample_fields();

        store.add_user("bob", &salt, &sig, &enc).unwrap();
        let err = store.add_user("bob", &salt, &sig, &enc).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateUsername));

        assert_eq!(store.user_count().unwrap(), 1);
    }

    #[test]
    fn test_ids_strictly_increasing() {
        let store = UserStore::in_memory().unwrap();
        let (salt, sig, enc) = sample_fields();

        let a = store.add_user("a", &salt, &sig, &enc).unwrap();
        let b = store.add_user("b", &salt, &sig, &enc).unwrap();
        let c = store.add_user("c", &salt, &sig, &enc).unwrap();
        assert!(a.id < b.id);
        assert!(b.id < c.id);
    }

    #[test]
    fn test_reopen_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.db");
        let (salt, sig, enc) = sample_fields();

        {
            let store = UserStore::open(&path).unwrap();
            store.add_user("carol", &salt, &sig, &enc).unwrap();
        }

        // Re-opening re-runs the schema; existing data must survive.
        let store = UserStore::open(&path).unwrap();
        assert!(store.user_exists("carol").unwrap());
        assert_eq!(store.user_count().unwrap(), 1);
    }

    #[test]
    fn test_created_at_is_set() {
        let store = UserStore::in_memory().unwrap();
        let (salt, sig, enc) = sample_fields();

        let before = chrono::Utc::now() - chrono::Duration::minutes(1);
        let record = store.add_user("dave", &salt, &sig, &enc).unwrap();
        assert!(record.created_at > before);
    }
}
