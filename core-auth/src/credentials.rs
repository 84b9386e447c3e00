//! Session credential persistence.
//!
//! The session lives under three keys in the host key-value store:
//! `access_token`, `refresh_token` and `user` (JSON profile snapshot).
//! Nothing is cached in memory; every read goes to the store so a token
//! written by another component is picked up on the next request.

use crate::error::{AuthError, Result};
use crate::types::{Credential, RefreshedTokens};
use bridge_traits::storage::KeyValueStore;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";

/// Typed view over the credential keys of a [`KeyValueStore`].
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
}

impl CredentialStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Empty strings count as absent; some hosts return `""` for missing keys.
    async fn read(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .store
            .get(key)
            .await
            .map_err(|e| AuthError::StorageUnavailable(e.to_string()))?;
        Ok(value.filter(|v| !v.is_empty()))
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        self.store
            .set(key, value)
            .await
            .map_err(|e| AuthError::StorageUnavailable(e.to_string()))
    }

    pub async fn access_token(&self) -> Result<Option<String>> {
        self.read(ACCESS_TOKEN_KEY).await
    }

    pub async fn refresh_token(&self) -> Result<Option<String>> {
        self.read(REFRESH_TOKEN_KEY).await
    }

    /// Both tokens, or `None` when no access token is stored.
    pub async fn credential(&self) -> Result<Option<Credential>> {
        let Some(access) = self.access_token().await? else {
            return Ok(None);
        };
        let refresh = self.refresh_token().await?;
        Ok(Some(Credential::new(access, refresh)))
    }

    /// Persist a fresh login.
    pub async fn store_credential(&self, credential: &Credential) -> Result<()> {
        self.write(ACCESS_TOKEN_KEY, credential.access_token()).await?;
        if let Some(refresh) = credential.refresh_token() {
            self.write(REFRESH_TOKEN_KEY, refresh).await?;
        }
        debug!(
            has_refresh_token = credential.refresh_token().is_some(),
            "Stored session credential"
        );
        Ok(())
    }

    /// Persist the result of a refresh. The stored refresh token is only
    /// replaced when the server rotated it.
    pub async fn apply_refresh(&self, tokens: &RefreshedTokens) -> Result<()> {
        self.write(ACCESS_TOKEN_KEY, &tokens.access_token).await?;
        if let Some(refresh) = tokens.refresh_token.as_deref() {
            self.write(REFRESH_TOKEN_KEY, refresh).await?;
        }
        Ok(())
    }

    pub async fn user(&self) -> Result<Option<Value>> {
        let Some(raw) = self.read(USER_KEY).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(error = %e, "Stored user profile is not valid JSON, ignoring it");
                Ok(None)
            }
        }
    }

    pub async fn set_user(&self, user: &Value) -> Result<()> {
        let raw =
            serde_json::to_string(user).map_err(|e| AuthError::Serialization(e.to_string()))?;
        self.write(USER_KEY, &raw).await
    }

    /// Remove every session key.
    ///
    /// All three removals are attempted even if one fails; the first
    /// failure is returned.
    pub async fn clear(&self) -> Result<()> {
        let mut first_error = None;
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.store.remove(key).await {
                warn!(key, error = %e, "Failed to remove session key");
                first_error.get_or_insert(AuthError::StorageUnavailable(e.to_string()));
            }
        }
        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
