use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Credential storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("No refresh token stored")]
    MissingRefreshToken,

    #[error("Token refresh rejected with status {status}")]
    RefreshRejected { status: u16 },

    #[error("Token refresh transport failed: {message}")]
    RefreshTransport { message: String, timed_out: bool },

    #[error("Invalid refresh response: {0}")]
    InvalidRefreshResponse(String),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Not authenticated")]
    NotAuthenticated,
}

pub type Result<T> = std::result::Result<T, AuthError>;
