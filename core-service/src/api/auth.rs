//! Account endpoints: sign-in, registration, profile and password.
//!
//! Sign-in and registration are sent without a bearer token. Successful
//! sign-in persists the returned token pair through the gateway's
//! [`CredentialStore`](core_auth::CredentialStore), which is what every
//! later request reads its `Authorization` header from.

use core_auth::{Credential, TokenPair};
use core_request::{ApiRequest, RequestGateway};
use core_runtime::events::{AuthEvent, CoreEvent};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use tracing::{info, instrument, warn};

use crate::error::{CoreError, Result};

const TOKEN: &str = "auth/token/";
const REGISTER: &str = "auth/register/";
const LOGOUT: &str = "auth/logout/";
const PROFILE: &str = "auth/profile/";
const PROFILE_UPDATE: &str = "auth/profile/update/";
const CHANGE_PASSWORD: &str = "auth/change-password/";

/// Registration payload.
#[derive(Clone, Serialize)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl RegisterForm {
    /// Form with the confirmation field mirroring `password`.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        let password = password.into();
        Self {
            username: username.into(),
            email: email.into(),
            password_confirm: password.clone(),
            password,
            phone: None,
            first_name: None,
            last_name: None,
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self.last_name = Some(last_name.into());
        self
    }
}

impl fmt::Debug for RegisterForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("phone", &self.phone)
            .finish_non_exhaustive()
    }
}

/// Account operations for the current user.
#[derive(Clone)]
pub struct AuthApi {
    gateway: RequestGateway,
}

impl AuthApi {
    pub fn new(gateway: RequestGateway) -> Self {
        Self { gateway }
    }

    /// Obtain a token pair and persist it.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let request = ApiRequest::post(TOKEN)
            .with_data(json!({ "username": username, "password": password }))
            .anonymous();
        let body = self.gateway.request(request).await?;

        let tokens: TokenPair = serde_json::from_value(body)
            .map_err(|e| CoreError::InvalidResponse(format!("token response: {}", e)))?;
        let access = tokens
            .access_token()
            .ok_or_else(|| CoreError::InvalidResponse("token response has no access token".into()))?;
        let credential = Credential::new(access, tokens.refresh_token().map(str::to_owned));

        self.gateway.credentials().store_credential(&credential).await?;
        info!("Signed in");
        let _ = self
            .gateway
            .event_bus()
            .emit(CoreEvent::Auth(AuthEvent::SignedIn {
                username: Some(username.to_string()),
            }));
        Ok(())
    }

    pub async fn register(&self, form: &RegisterForm) -> Result<Value> {
        let request = ApiRequest::post(REGISTER).with_json(form)?.anonymous();
        Ok(self.gateway.request(request).await?)
    }

    /// Tell the server, then forget the session locally.
    ///
    /// The server call is skipped when no access token is stored; its
    /// failure never prevents the local sign-out.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<()> {
        if self.is_logged_in().await {
            if let Err(err) = self.gateway.request(ApiRequest::post(LOGOUT)).await {
                warn!(error = %err, "Server logout failed; clearing local session anyway");
            }
        }

        self.gateway.credentials().clear().await?;
        info!("Signed out");
        let _ = self
            .gateway
            .event_bus()
            .emit(CoreEvent::Auth(AuthEvent::SignedOut));
        Ok(())
    }

    /// Fetch the profile and cache it under the `user` key.
    pub async fn profile(&self) -> Result<Value> {
        let profile = self.gateway.request(ApiRequest::get(PROFILE)).await?;
        self.cache_user(&profile).await;
        Ok(profile)
    }

    pub async fn update_profile(&self, patch: Value) -> Result<Value> {
        let profile = self
            .gateway
            .request(ApiRequest::put(PROFILE_UPDATE).with_data(patch))
            .await?;
        self.cache_user(&profile).await;
        Ok(profile)
    }

    #[instrument(skip_all)]
    pub async fn change_password(&self, old_password: &str, new_password: &str) -> Result<Value> {
        let request = ApiRequest::post(CHANGE_PASSWORD).with_data(json!({
            "old_password": old_password,
            "new_password": new_password,
            "new_password_confirm": new_password,
        }));
        Ok(self.gateway.request(request).await?)
    }

    /// Whether an access token is stored. Storage failures read as signed out.
    pub async fn is_logged_in(&self) -> bool {
        matches!(self.gateway.credentials().access_token().await, Ok(Some(_)))
    }

    /// Profile cached by the last [`profile`](Self::profile) call.
    pub async fn current_user(&self) -> Result<Option<Value>> {
        Ok(self.gateway.credentials().user().await?)
    }

    async fn cache_user(&self, profile: &Value) {
        if let Err(err) = self.gateway.credentials().set_user(profile).await {
            warn!(error = %err, "Failed to cache user profile");
        }
    }
}
