//! Extractors whose rejections are rendered as [`AppError`] envelopes.
//!
//! axum's stock extractors reject with plain-text bodies; these wrappers keep
//! every response in the `{data, meta}` shape.

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON request body.
///
/// The body is decoded whatever the `Content-Type` header says. Any read or
/// decode failure becomes a 400 "Invalid JSON body".
#[derive(Debug)]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await?;
        serde_json::from_slice(&bytes).map(Self).map_err(|err| {
            tracing::debug!(error = %err, "Rejected JSON body");
            AppError::invalid_body()
        })
    }
}

/// Path parameters. A malformed path becomes a 404.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Query string parameters.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
