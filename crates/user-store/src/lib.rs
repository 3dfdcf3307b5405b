//! User persistence for the pod server.
//!
//! One table, one invariant: no two live records share a `username`. The
//! UNIQUE constraint on that column is the authoritative arbiter of name
//! availability; callers may run an existence pre-check first, but only the
//! insert decides.

mod error;
mod store;
mod types;

pub use error::StoreError;
pub use store::UserStore;
pub use types::UserRecord;
