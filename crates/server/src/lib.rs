//! Userbase Server - JSON-over-HTTP user API.
//!
//! This crate provides the server as a library so the router can be driven
//! in-process by tests and reused by the CLI, which shares the file store.
//!
//! # Architecture
//!
//! - Axum web framework, JSON request and response bodies
//! - Flat-file persistence in [`store`]; the whole table is read per request
//! - Validated domain types from `userbase-core`
//! - Sentry error tracking and `tracing` structured logging

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;
pub mod telemetry;

use axum::Router;

use state::AppState;

/// Build the full application router with its middleware stack.
///
/// Sentry layers are added by the binary, outside this router, so that they
/// wrap every request including ones that fail before routing.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::routes())
        .layer(axum::middleware::from_fn(
            middleware::api_headers_middleware,
        ))
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(middleware::trace_layer())
        .with_state(state)
}
