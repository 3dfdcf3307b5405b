//! HTTP request handlers.

use axum::{extract::State, Json};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::{error, info};

use super::types::{HealthResponse, RegisterUsernameRequest, RegisterUsernameResponse};
use super::AppState;
use crate::error::RegistrationError;
use crate::registration;

/// Health check endpoint.
pub async fn health(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, RegistrationError> {
    let user_count = state.store.user_count().map_err(|e| {
        error!(error = %e, "Failed to query user store");
        RegistrationError::StoreUnavailable
    })?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        user_count,
    }))
}

/// Register a username bound to two client public keys.
pub async fn register_username(
    State(state): State<AppState>,
    Json(request): Json<RegisterUsernameRequest>,
) -> Result<Json<RegisterUsernameResponse>, RegistrationError> {
    info!(username = %request.username, "Registration request received");

    let request = request.decode()?;
    let username = request.username.clone();

    let signature = registration::register(request, &state.trust, &state.store)?;

    Ok(Json(RegisterUsernameResponse {
        username,
        server_signature: STANDARD.encode(signature),
    }))
}
