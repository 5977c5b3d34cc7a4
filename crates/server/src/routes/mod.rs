//! HTTP route handlers for the user API.
//!
//! # Route Structure
//!
//! ```text
//! GET     /health             - Liveness check
//! GET     /health/ready       - Readiness check (data file readable)
//!
//! # Users
//! GET     /api/users          - Paginated list (?limit=&page=)
//! POST    /api/users          - Create user
//! OPTIONS /api/users          - CORS preflight
//! GET     /api/users/{id}     - Fetch user
//! PUT     /api/users/{id}     - Replace user (creates if absent)
//! PATCH   /api/users/{id}     - Partially update user
//! DELETE  /api/users/{id}     - Delete user
//! OPTIONS /api/users/{id}     - CORS preflight
//! ```
//!
//! Unknown paths answer 404 and unsupported methods 405, both with the
//! usual error envelope.

pub mod envelope;
pub mod extract;
pub mod health;
pub mod users;

use axum::{Router, routing::get};

use crate::error::AppError;
use crate::state::AppState;

/// Create the user resource routes.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/users",
            get(users::index)
                .post(users::create)
                .options(users::options),
        )
        .route(
            "/api/users/{id}",
            get(users::show)
                .put(users::replace)
                .patch(users::update)
                .delete(users::delete)
                .options(users::options),
        )
}

/// Create all routes for the server.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(user_routes())
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
}

async fn not_found() -> AppError {
    AppError::NotFound("Not found".to_string())
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
