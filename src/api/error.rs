//! Failure classification for collaborator endpoints.
//!
//! Every endpoint call resolves to either a value or an [`ApiFailure`]. The
//! variants map onto how the console reacts:
//! - `Network`: nothing came back; the user retries by hand
//! - `Validation`: a 4xx carrying an `errors` map that forms redistribute
//!   per field
//! - `Server`: anything else, surfaced as one global message

use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Shown whenever a failure carries nothing more useful.
pub const GENERIC_FAILURE_MESSAGE: &str = "Unexpected error. Please try again later.";

const NETWORK_FAILURE_MESSAGE: &str = "Network error. Check your connection and try again.";

/// Coarse category of a failed (or discarded) request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    NetworkFailure,
    ValidationFailure,
    ServerFailure,
    /// A response that arrived after a newer request was issued. Never
    /// surfaced to the user.
    StaleResponse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::NetworkFailure => write!(f, "network failure"),
            FailureKind::ValidationFailure => write!(f, "validation failure"),
            FailureKind::ServerFailure => write!(f, "server failure"),
            FailureKind::StaleResponse => write!(f, "stale response"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiFailure {
    #[error("network failure: {0}")]
    Network(String),

    #[error("validation failed (HTTP {status})")]
    Validation { status: u16, payload: Value },

    #[error("server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },
}

impl ApiFailure {
    /// Classify a non-2xx response from its status code and raw body.
    ///
    /// A 4xx whose body has an `errors` object or array is a validation
    /// failure and keeps the parsed body so the form can redistribute it.
    /// Everything else, unstructured 4xx included, becomes a server failure
    /// with the body's `message`/`error` string when there is one.
    pub fn from_response(status: u16, body: &str) -> Self {
        let payload = parse_body(body);

        if (400..500).contains(&status) && has_field_errors(&payload) {
            return ApiFailure::Validation { status, payload };
        }

        let message = flat_message(&payload).unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
        ApiFailure::Server { status, message }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            ApiFailure::Network(_) => FailureKind::NetworkFailure,
            ApiFailure::Validation { .. } => FailureKind::ValidationFailure,
            ApiFailure::Server { .. } => FailureKind::ServerFailure,
        }
    }

    /// The single line shown to the user when this failure is not
    /// redistributed into form fields.
    pub fn user_message(&self) -> String {
        match self {
            ApiFailure::Network(_) => NETWORK_FAILURE_MESSAGE.to_string(),
            ApiFailure::Validation { payload, .. } => {
                flat_message(payload).unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string())
            }
            ApiFailure::Server { message, .. } => message.clone(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiFailure::Network(_) => None,
            ApiFailure::Validation { status, .. } | ApiFailure::Server { status, .. } => {
                Some(*status)
            }
        }
    }
}

impl From<reqwest::Error> for ApiFailure {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            return ApiFailure::Network("request timed out".to_string());
        }
        if let Some(status) = error.status() {
            return ApiFailure::Server {
                status: status.as_u16(),
                message: GENERIC_FAILURE_MESSAGE.to_string(),
            };
        }
        ApiFailure::Network(error.to_string())
    }
}

fn parse_body(body: &str) -> Value {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
}

fn has_field_errors(payload: &Value) -> bool {
    matches!(
        payload.get("errors"),
        Some(Value::Object(_) | Value::Array(_))
    )
}

/// Top-level `message` (or `error`) string of a payload.
pub(crate) fn flat_message(payload: &Value) -> Option<String> {
    match payload {
        Value::Object(map) => ["message", "error"].iter().find_map(|key| {
            map.get(*key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
        }),
        _ => None,
    }
}
