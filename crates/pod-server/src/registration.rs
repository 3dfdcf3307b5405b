//! The registration protocol.
//!
//! Linear state machine, no retries: validate → uniqueness pre-check →
//! sign → persist → respond. The pre-check is a fast path that avoids
//! needless signing work; the UNIQUE constraint enforced at insert time is
//! the correctness backstop for concurrent registrations of the same name.

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{error, info, warn};
use user_store::{StoreError, UserStore};

use crate::error::RegistrationError;
use crate::trust::TrustRoot;

/// Required salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Required public key length in bytes (both keys).
pub const PUBLIC_KEY_LEN: usize = 32;

/// A decoded registration request.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub username: String,
    pub salt: Vec<u8>,
    pub public_signing_key: Vec<u8>,
    pub public_encryption_key: Vec<u8>,
}

impl RegistrationRequest {
    /// Check the fixed-length invariants. Checked in a fixed order
    /// (salt, signing key, encryption key), so the first malformed field
    /// decides the reported error.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        if self.salt.len() != SALT_LEN {
            return Err(RegistrationError::InvalidSalt);
        }
        if self.public_signing_key.len() != PUBLIC_KEY_LEN {
            return Err(RegistrationError::InvalidSigningKey);
        }
        if self.public_encryption_key.len() != PUBLIC_KEY_LEN {
            return Err(RegistrationError::InvalidEncryptionKey);
        }
        Ok(())
    }
}

/// Register a username and return the server's counter-signature.
///
/// On success the name is durably reserved and the raw signature bytes are
/// returned; a signature is never returned for a registration that did not
/// commit. If another caller reserves the name between the pre-check and the
/// insert, the already-computed signature is discarded and the caller sees
/// the same `UsernameTaken` as on the fast path.
pub fn register(
    request: RegistrationRequest,
    trust: &TrustRoot,
    store: &UserStore,
) -> Result<Vec<u8>, RegistrationError> {
    request.validate()?;

    // Fast path only; the insert below is the authoritative check.
    let exists = store.user_exists(&request.username).map_err(|e| {
        error!(error = %e, "Failed to query user store");
        RegistrationError::StoreUnavailable
    })?;
    if exists {
        warn!(username = %request.username, "Username already taken");
        return Err(RegistrationError::UsernameTaken(request.username));
    }

    let signature = sign_registration(trust, &request)?;

    match store.add_user(
        &request.username,
        &request.salt,
        &request.public_signing_key,
        &request.public_encryption_key,
    ) {
        Ok(record) => {
            info!(username = %record.username, id = record.id, "Username registered");
            Ok(signature)
        }
        Err(StoreError::DuplicateUsername) => {
            // Lost the race with a concurrent registration of the same
            // name. An unreserved name must never carry a valid server
            // signature, so the one computed above is dropped here.
            warn!(username = %request.username, "Username reserved concurrently");
            Err(RegistrationError::UsernameTaken(request.username))
        }
        Err(e) => {
            error!(error = %e, "Failed to persist user");
            Err(RegistrationError::StoreUnavailable)
        }
    }
}

/// Sign the registration binding.
///
/// The Unix timestamp is taken fresh at signing time and is neither
/// returned to the caller nor persisted, so two signatures over identical
/// fields generally differ and the exact signed message cannot be
/// reconstructed after the call returns. This mirrors the existing wire
/// behavior; see DESIGN.md.
fn sign_registration(
    trust: &TrustRoot,
    request: &RegistrationRequest,
) -> Result<Vec<u8>, RegistrationError> {
    let timestamp = Utc::now().timestamp().to_string();
    let message = registration_message(trust.domain(), request, &timestamp);
    let digest = Sha256::digest(&message);
    trust.sign_digest(digest.as_slice()).map_err(|e| {
        error!(error = %e, "Failed to sign registration data");
        RegistrationError::from(e)
    })
}

/// Message layout: domain || username || salt || decimal timestamp ||
/// signing key || encryption key. Verifiers must reproduce this exact order.
fn registration_message(
    domain: &str,
    request: &RegistrationRequest,
    timestamp: &str,
) -> Vec<u8> {
    let mut message = Vec::with_capacity(
        domain.len()
            + request.username.len()
            + request.salt.len()
            + timestamp.len()
            + request.public_signing_key.len()
            + request.public_encryption_key.len(),
    );
    message.extend_from_slice(domain.as_bytes());
    message.extend_from_slice(request.username.as_bytes());
    message.extend_from_slice(&request.salt);
    message.extend_from_slice(timestamp.as_bytes());
    message.extend_from_slice(&request.public_signing_key);
    message.extend_from_slice(&request.public_encryption_key);
    message
}
