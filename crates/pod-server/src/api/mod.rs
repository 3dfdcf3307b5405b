//! HTTP API for the registration service.
//!
//! The protocol core is transport-agnostic; this module is the one wire
//! surface, a JSON API with permissive CORS so browser clients can call it
//! directly.

mod handlers;
mod types;

pub use handlers::*;
pub use types::*;

use crate::trust::TrustRoot;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use user_store::UserStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// User persistence
    pub store: Arc<UserStore>,
    /// Server signing key, immutable after load
    pub trust: Arc<TrustRoot>,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: UserStore, trust: TrustRoot) -> Self {
        Self {
            store: Arc::new(store),
            trust: Arc::new(trust),
        }
    }
}

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/v1/register", post(handlers::register_username))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
