//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers should return
//! `Result<T, AppError>`.
//!
//! Every error response uses the API envelope with a null payload:
//!
//! ```json
//! {"data": null, "meta": {"message": "User not found"}}
//! ```

use axum::{
    extract::rejection::{BytesRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::routes::envelope::Envelope;
use crate::store::StoreError;

/// Application-level error type for the user API.
#[derive(Debug, Error)]
pub enum AppError {
    /// File store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No handler for this method on an existing path.
    #[error("Method not allowed")]
    MethodNotAllowed,
}

impl AppError {
    /// The message shown to clients.
    ///
    /// Internal error details are never exposed.
    #[must_use]
    pub fn public_message(&self) -> &str {
        match self {
            Self::Store(_) => "Internal server error",
            Self::NotFound(msg) | Self::BadRequest(msg) => msg,
            Self::MethodNotAllowed => "Method not allowed",
        }
    }

    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
        }
    }

    /// The 404 returned for any unknown user id.
    #[must_use]
    pub fn user_not_found() -> Self {
        Self::NotFound("User not found".to_string())
    }

    /// The 400 returned for any body that is not a JSON object.
    #[must_use]
    pub fn invalid_body() -> Self {
        Self::BadRequest("Invalid JSON body".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Store(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let status = self.status();
        let body = Envelope::<()>::message_only(self.public_message());
        (status, body).into_response()
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        tracing::debug!(error = %rejection, "Unreadable request body");
        Self::invalid_body()
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(error = %rejection, "Rejected query string");
        Self::BadRequest("Invalid query string".to_string())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection, "Rejected path parameter");
        Self::user_not_found()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for a user mutation.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of writes
/// leading up to an error.
pub fn add_breadcrumb(action: &str, user_id: &str) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some("users".to_string()),
        message: Some(action.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };
    breadcrumb.data.insert(
        "user_id".to_string(),
        serde_json::Value::String(user_id.to_string()),
    );
    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn encode_error() -> StoreError {
        StoreError::Encode(serde_json::from_str::<serde_json::Value>("[").unwrap_err())
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("user-123".to_string());
        assert_eq!(err.to_string(), "Not found: user-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::MethodNotAllowed),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            get_status(AppError::Store(encode_error())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_error_body_is_envelope() {
        let body = body_json(AppError::user_not_found().into_response()).await;
        assert_eq!(
            body,
            serde_json::json!({"data": null, "meta": {"message": "User not found"}})
        );
    }

    #[tokio::test]
    async fn test_store_details_hidden() {
        let err = AppError::Store(StoreError::Corrupt {
            path: "/var/lib/userbase/users.json".into(),
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        });
        let body = body_json(err.into_response()).await;
        assert_eq!(body["meta"]["message"], "Internal server error");
        assert!(!body.to_string().contains("/var/lib"));
    }
}
