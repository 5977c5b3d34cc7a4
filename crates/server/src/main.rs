//! Userbase Server - JSON user API.
//!
//! This binary serves the `/api/users` resource on port 8000 by default,
//! persisting to the JSON file named by `USERBASE_DATA_FILE`.
//!
//! See [`userbase_server::config`] for every environment variable.

#![cfg_attr(not(test), forbid(unsafe_code))]

use userbase_server::config::ServerConfig;
use userbase_server::state::AppState;
use userbase_server::store::UserStore;
use userbase_server::telemetry;

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = ServerConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = telemetry::init_sentry(&config.sentry);

    telemetry::init_tracing(config.log_format);

    let store = UserStore::open(config.data_file.clone())
        .await
        .expect("Failed to open user store");
    match store.count().await {
        Ok(users) => tracing::info!(path = %store.path().display(), users, "User store ready"),
        Err(e) => tracing::warn!(error = %e, "User store is not readable; requests will fail"),
    }

    let addr = config.socket_addr();
    let state = AppState::new(config, store);

    // Sentry layers (outermost for full request coverage)
    let app = userbase_server::app(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    tracing::info!("userbase listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
