//! Health check endpoints.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies the data file can be read and decoded.
/// Returns 503 Service Unavailable otherwise.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().check().await {
        Ok(()) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    use super::*;
    use crate::config::ServerConfig;
    use crate::store::UserStore;

    async fn get_status(store_contents: Option<&str>) -> StatusCode {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        if let Some(contents) = store_contents {
            tokio::fs::write(&path, contents).await.unwrap();
        }
        let store = UserStore::open(path).await.unwrap();
        let app = crate::app(AppState::new(ServerConfig::default(), store));

        let request = Request::builder()
            .uri("/health/ready")
            .body(Body::empty())
            .unwrap();
        app.oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_ready_with_missing_file() {
        assert_eq!(get_status(None).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_not_ready_with_corrupt_file() {
        assert_eq!(
            get_status(Some("[1, 2")).await,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
