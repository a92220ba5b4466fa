//! Payload Module
//!
//! Tagged result of a fetch, so callers never sniff JSON shape themselves.

use serde::Serialize;
use serde_json::Value;

// == Payload ==
/// A decoded API response body.
///
/// Only `Success` bodies may be written to a cache.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "body", rename_all = "lowercase")]
pub enum Payload {
    Success(Value),
    Failure(Value),
}

/// Error code and message carried by a failure body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: Option<i64>,
    pub message: String,
}

impl Payload {
    /// Classifies a response body: an object carrying an `error` or `code`
    /// field is a failure.
    pub fn classify(body: Value) -> Self {
        let is_failure = body
            .as_object()
            .map(|obj| obj.contains_key("error") || obj.contains_key("code"))
            .unwrap_or(false);

        if is_failure {
            Self::Failure(body)
        } else {
            Self::Success(body)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn body(&self) -> &Value {
        match self {
            Self::Success(body) | Self::Failure(body) => body,
        }
    }

    pub fn into_body(self) -> Value {
        match self {
            Self::Success(body) | Self::Failure(body) => body,
        }
    }

    /// Extracts `{code, message}` from a failure body.
    ///
    /// Falls back to `error_description` / `error` when there is no
    /// `message`, which is how OAuth errors are shaped.
    pub fn api_error(&self) -> Option<ApiError> {
        let Self::Failure(body) = self else {
            return None;
        };

        let message = ["message", "error_description", "error"]
            .iter()
            .find_map(|field| body.get(*field).and_then(Value::as_str))
            .unwrap_or("unknown error")
            .to_owned();

        Some(ApiError {
            code: body.get("code").and_then(Value::as_i64),
            message,
        })
    }
}
