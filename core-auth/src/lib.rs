//! # Core Authentication Module
//!
//! Session credentials for the wrongbook client core.
//!
//! ## Overview
//!
//! - [`CredentialStore`] reads and writes `access_token`, `refresh_token` and
//!   `user` in the host key-value store
//! - [`TokenRefresher`] performs the refresh endpoint call
//! - [`SessionTerminator`] clears the session, tells the user, and sends them
//!   to the login view
//!
//! Deciding *when* to refresh, and making concurrent callers share a single
//! refresh, is the job of `core-request`.
//!
//! ## Security
//!
//! Token values are never logged; `Debug` on every token-bearing type is
//! redacted.

pub mod credentials;
pub mod error;
pub mod refresh;
pub mod session;
pub mod types;

pub use credentials::{CredentialStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY};
pub use error::{AuthError, Result};
pub use refresh::TokenRefresher;
pub use session::{SessionTerminator, TerminationReason, SESSION_EXPIRED_MESSAGE};
pub use types::{Credential, RefreshedTokens, TokenPair};
