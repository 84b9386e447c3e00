//! Outcome classification.
//!
//! Pure mapping from HTTP statuses, error bodies and transport faults to the
//! messages shown to users. No control flow decisions are made here.

use crate::error::{NetworkFailureKind, RequestError};
use bridge_traits::error::BridgeError;
use bytes::Bytes;
use serde_json::Value;

pub const TIMEOUT_MESSAGE: &str = "Request timed out, please try again";
pub const NETWORK_ERROR_MESSAGE: &str = "Network error, please check your connection";

/// Default message for an HTTP status.
pub fn status_message(status: u16) -> String {
    let message = match status {
        400 => "Bad request",
        401 => "Unauthorized, please log in again",
        403 => "Access denied",
        404 => "Requested resource not found",
        408 => "Request timed out",
        500 => "Internal server error",
        501 => "Service not implemented",
        502 => "Bad gateway",
        503 => "Service unavailable",
        504 => "Gateway timeout",
        505 => "HTTP version not supported",
        other => return format!("Request failed with status {}", other),
    };
    message.to_string()
}

/// Pull a human-readable message out of an error body.
///
/// Looks at `error.message`, then `error` (when it is a string), then
/// `detail`, then `message`. Blank strings are skipped.
pub fn server_message(body: &Value) -> Option<String> {
    let candidates = [
        body.pointer("/error/message"),
        body.get("error"),
        body.get("detail"),
        body.get("message"),
    ];

    candidates
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|message| !message.is_empty())
        .map(str::to_string)
}

/// Server-provided message if the body has one, else the status table.
pub fn response_message(status: u16, body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| server_message(&value))
        .unwrap_or_else(|| status_message(status))
}

pub fn request_failed(status: u16, body: &[u8]) -> RequestError {
    RequestError::RequestFailed {
        status,
        message: response_message(status, body),
    }
}

pub fn unauthorized(status: u16, body: Bytes) -> RequestError {
    RequestError::Unauthorized {
        status,
        message: response_message(status, &body),
        body,
    }
}

/// Map a transport fault, keeping timeouts distinguishable.
pub fn network_failure(error: &BridgeError) -> RequestError {
    if error.is_timeout() {
        timeout_failure()
    } else {
        RequestError::NetworkFailure {
            kind: NetworkFailureKind::Connection,
            message: NETWORK_ERROR_MESSAGE.to_string(),
        }
    }
}

pub fn timeout_failure() -> RequestError {
    RequestError::NetworkFailure {
        kind: NetworkFailureKind::Timeout,
        message: TIMEOUT_MESSAGE.to_string(),
    }
}

/// Parse a success body. Empty bodies become `null` and non-JSON bodies
/// are returned as a string.
pub fn success_body(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}
