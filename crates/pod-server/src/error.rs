//! Error types for the registration service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::trust::TrustError;

/// Registration error taxonomy.
///
/// Exactly one of {signature, one of these errors} per call. The `Invalid*`
/// variants are client faults with no side effects; everything from
/// `UnsupportedKeyAlgorithm` down is a server fault and collapses to a
/// generic response at the HTTP boundary.
#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("salt must be 16 bytes")]
    InvalidSalt,

    #[error("signing key must be 32 bytes")]
    InvalidSigningKey,

    #[error("encryption key must be 32 bytes")]
    InvalidEncryptionKey,

    #[error("username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("server signing key algorithm is not supported")]
    UnsupportedKeyAlgorithm,

    #[error("failed to sign registration data")]
    SigningFailed,

    #[error("user store unavailable")]
    StoreUnavailable,

    #[error("internal server error")]
    Internal,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for RegistrationError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            RegistrationError::InvalidSalt => (StatusCode::BAD_REQUEST, "INVALID_SALT"),
            RegistrationError::InvalidSigningKey => (StatusCode::BAD_REQUEST, "INVALID_SIGNING_KEY"),
            RegistrationError::InvalidEncryptionKey => {
                (StatusCode::BAD_REQUEST, "INVALID_ENCRYPTION_KEY")
            }
            RegistrationError::UsernameTaken(_) => (StatusCode::CONFLICT, "USERNAME_TAKEN"),
            RegistrationError::UnsupportedKeyAlgorithm
            | RegistrationError::SigningFailed
            | RegistrationError::StoreUnavailable
            | RegistrationError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        // Server-side failure detail stays in the log; the wire sees a
        // fixed message.
        let error = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        let body = ErrorResponse {
            error,
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<TrustError> for RegistrationError {
    fn from(e: TrustError) -> Self {
        match e {
            TrustError::UnsupportedKeyAlgorithm(_) => RegistrationError::UnsupportedKeyAlgorithm,
            TrustError::SigningFailed(_) => RegistrationError::SigningFailed,
            // Load-class errors are fatal at startup; reaching one here
            // means the process is misconfigured.
            TrustError::KeyUnreadable(_) | TrustError::KeyFormatInvalid(_) => {
                RegistrationError::Internal
            }
        }
    }
}
