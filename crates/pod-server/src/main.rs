//! Pod server - entry point.

use pod_server::{
    api::{create_router, AppState},
    config::Config,
    trust::TrustRoot,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use user_store::UserStore;

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting pod server");

    // Load the signing key. Without a usable trust root the server must not
    // accept any registrations, so a load failure is fatal.
    let trust = match TrustRoot::load(&config.signing.key_path, config.signing.domain.clone()) {
        Ok(t) => {
            info!(domain = %t.domain(), "Signing key loaded");
            t
        }
        Err(e) => {
            error!("Failed to load signing key: {}", e);
            std::process::exit(1);
        }
    };

    // Open the user database
    let store = match UserStore::open(&config.database.path) {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to initialize user store: {}", e);
            std::process::exit(1);
        }
    };

    // Create application state and router
    let state = AppState::new(store, trust);
    let app = create_router(state);

    // Bind to address
    let addr = SocketAddr::new(
        config.server.listen_addr.parse().unwrap_or([0, 0, 0, 0].into()),
        config.server.port,
    );

    info!("Listening on {}", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
