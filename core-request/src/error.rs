use bytes::Bytes;
use thiserror::Error;

/// What kind of transport fault ended a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkFailureKind {
    Timeout,
    Connection,
}

/// Every way a gateway request can fail.
///
/// `Clone` so one refresh failure can settle a whole cohort of waiting
/// callers with the same value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestError {
    /// The transport could not complete the exchange. Never retried.
    #[error("{message}")]
    NetworkFailure {
        kind: NetworkFailureKind,
        message: String,
    },

    /// The server answered with a status other than 200, 201 or 401.
    #[error("{message} (status {status})")]
    RequestFailed { status: u16, message: String },

    /// A 401 that could not be recovered from. `body` is the raw body of the
    /// 401 response that started the recovery attempt.
    #[error("Unauthorized: {message}")]
    Unauthorized {
        status: u16,
        message: String,
        body: Bytes,
    },

    /// The refresh endpoint itself answered 401.
    #[error("Refresh token rejected: {message}")]
    RefreshExhausted { message: String },

    /// The request could not be built (bad path, unserialisable payload).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl RequestError {
    /// The user-facing message for this failure.
    pub fn message(&self) -> &str {
        match self {
            RequestError::NetworkFailure { message, .. }
            | RequestError::RequestFailed { message, .. }
            | RequestError::Unauthorized { message, .. }
            | RequestError::RefreshExhausted { message } => message,
            RequestError::InvalidRequest(message) => message,
        }
    }

    /// HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::RequestFailed { status, .. }
            | RequestError::Unauthorized { status, .. } => Some(*status),
            RequestError::RefreshExhausted { .. } => Some(401),
            RequestError::NetworkFailure { .. } | RequestError::InvalidRequest(_) => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            RequestError::NetworkFailure {
                kind: NetworkFailureKind::Timeout,
                ..
            }
        )
    }

    /// Whether this failure ended the session.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            RequestError::Unauthorized { .. } | RequestError::RefreshExhausted { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, RequestError>;
