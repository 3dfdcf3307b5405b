//! API request and response types.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::RegistrationError;
use crate::registration::RegistrationRequest;

/// Request to register a username.
///
/// Byte fields travel base64-encoded. A field that does not decode is
/// reported with the same error as a wrong-length field.
#[derive(Debug, Deserialize)]
pub struct RegisterUsernameRequest {
    /// Desired username
    pub username: String,

    /// Client-generated salt, base64 (16 bytes decoded)
    pub salt: String,

    /// Client public signing key, base64 (32 bytes decoded)
    pub public_signing_key: String,

    /// Client public encryption key, base64 (32 bytes decoded)
    pub public_encryption_key: String,
}

impl RegisterUsernameRequest {
    /// Decode the wire shape into the protocol's input shape.
    pub fn decode(self) -> Result<RegistrationRequest, RegistrationError> {
        let salt = STANDARD
            .decode(&self.salt)
            .map_err(|_| RegistrationError::InvalidSalt)?;
        let public_signing_key = STANDARD
            .decode(&self.public_signing_key)
            .map_err(|_| RegistrationError::InvalidSigningKey)?;
        let public_encryption_key = STANDARD
            .decode(&self.public_encryption_key)
            .map_err(|_| RegistrationError::InvalidEncryptionKey)?;

        Ok(RegistrationRequest {
            username: self.username,
            salt,
            public_signing_key,
            public_encryption_key,
        })
    }
}

/// Response after a successful registration.
#[derive(Debug, Serialize)]
pub struct RegisterUsernameResponse {
    pub username: String,

    /// Server counter-signature over the username/key binding, base64
    pub server_signature: String,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub user_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_round_trip() {
        let request = RegisterUsernameRequest {
            username: "alice".into(),
            salt: STANDARD.encode([0u8; 16]),
            public_signing_key: STANDARD.encode([1u8; 32]),
            public_encryption_key: STANDARD.encode([2u8; 32]),
        };

        let decoded = request.decode().unwrap();
        assert_eq!(decoded.username, "alice");
        assert_eq!(decoded.salt, vec![0u8; 16]);
        assert_eq!(decoded.public_signing_key, vec![1u8; 32]);
        assert_eq!(decoded.public_encryption_key, vec![2u8; 32]);
    }

    #[test]
    fn test_undecodable_salt_reported_as_invalid_salt() {
        let request = RegisterUsernameRequest {
            username: "alice".into(),
            salt: "not base64!!".into(),
            public_signing_key: STANDARD.encode([1u8; 32]),
            public_encryption_key: STANDARD.encode([2u8; 32]),
        };

        assert!(matches!(
            request.decode().unwrap_err(),
            RegistrationError::InvalidSalt
        ));
    }
}
