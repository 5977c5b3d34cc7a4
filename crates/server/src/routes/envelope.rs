//! The `{data, meta?}` response envelope shared by every API response.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Response wrapper: `{"data": ..., "meta": {"message": ...}}`.
///
/// `meta` is omitted when there is no message. `data` is `null` for error
/// responses.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meta: Option<Meta>,
}

/// Envelope metadata.
#[derive(Debug, Serialize)]
pub struct Meta {
    message: String,
}

impl<T> Envelope<T> {
    /// Wrap a payload with no message.
    pub const fn data(data: T) -> Self {
        Self {
            data: Some(data),
            meta: None,
        }
    }

    /// Wrap a payload with a human-readable message.
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data: Some(data),
            meta: Some(Meta {
                message: message.into(),
            }),
        }
    }

    /// A null payload carrying only a message.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            data: None,
            meta: Some(Meta {
                message: message.into(),
            }),
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_data_only_omits_meta() {
        let value = serde_json::to_value(Envelope::data(json!({"id": "1"}))).unwrap();
        assert_eq!(value, json!({"data": {"id": "1"}}));
    }

    #[test]
    fn test_with_message() {
        let value = serde_json::to_value(Envelope::with_message(1, "done")).unwrap();
        assert_eq!(value, json!({"data": 1, "meta": {"message": "done"}}));
    }

    #[test]
    fn test_message_only_has_null_data() {
        let value = serde_json::to_value(Envelope::<()>::message_only("nope")).unwrap();
        assert_eq!(value, json!({"data": null, "meta": {"message": "nope"}}));
    }
}
