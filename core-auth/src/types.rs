use serde::{Deserialize, Serialize};
use std::fmt;

/// Bearer credentials for the current session.
///
/// Token values never appear in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    access_token: String,
    refresh_token: Option<String>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Token pair as returned by the token and refresh endpoints.
///
/// Both endpoints answer `{"access": ..., "refresh": ...}`; the refresh
/// endpoint only includes `refresh` when it rotates the refresh token.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
}

impl TokenPair {
    /// The access token, if the server returned a non-empty one.
    pub fn access_token(&self) -> Option<&str> {
        self.access.as_deref().filter(|token| !token.is_empty())
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh.as_deref().filter(|token| !token.is_empty())
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &self.access.as_ref().map(|_| "[REDACTED]"))
            .field("refresh", &self.refresh.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Outcome of a successful refresh call.
#[derive(Clone, PartialEq, Eq)]
pub struct RefreshedTokens {
    pub access_token: String,
    /// Present only when the server rotated the refresh token.
    pub refresh_token: Option<String>,
}

impl fmt::Debug for RefreshedTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshedTokens")
            .field("access_token", &"[REDACTED]")
            .field("rotated", &self.refresh_token.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("T1", Some("R1".to_string()));
        let debug = format!("{:?}", credential);
        assert!(!debug.contains("T1"));
        assert!(!debug.contains("R1"));
        assert!(debug.contains("[REDACTED]"));
        assert_eq!(credential.refresh_token(), Some("R1"));
    }

    #[test]
    fn test_token_pair_parsing() {
        let pair: TokenPair = serde_json::from_str(r#"{"access": "T2"}"#).unwrap();
        assert_eq!(pair.access_token(), Some("T2"));
        assert_eq!(pair.refresh_token(), None);

        let empty: TokenPair = serde_json::from_str(r#"{"access": "", "refresh": "R2"}"#).unwrap();
        assert_eq!(empty.access_token(), None);
        assert_eq!(empty.refresh_token(), Some("R2"));
    }
}
