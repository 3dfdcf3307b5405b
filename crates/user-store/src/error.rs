//! User storage errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A record with this username already exists. Raised by the UNIQUE
    /// constraint at insert time, never by a pre-check.
    #[error("username already exists")]
    DuplicateUsername,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                StoreError::DuplicateUsername
            }
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}
