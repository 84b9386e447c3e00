//! # Core Configuration Module
//!
//! Configuration for the wrongbook client core.
//!
//! ## Overview
//!
//! [`CoreConfigBuilder`] collects the API location, timing knobs and host
//! bridges, then validates everything at [`build()`](CoreConfigBuilder::build)
//! so a misconfigured host fails at startup rather than on the first request.
//!
//! ## Required Dependencies
//!
//! - `KeyValueStore` - Where `access_token`, `refresh_token` and `user` live
//! - `HttpClient` - Single-exchange transport
//! - `LoginNavigator` - Opens the login view when the session ends
//!
//! ## Optional Dependencies
//!
//! - `Notifier` - User-visible failure messages (defaults to silent without shims)
//!
//! When the `desktop-shims` feature is enabled, desktop defaults from
//! `bridge-desktop` are injected for every bridge that was not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::time::Duration;
//!
//! let config = CoreConfig::builder()
//!     .base_url("https://wrongbook.example.com/api/")
//!     .request_timeout(Duration::from_secs(15))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use bridge_traits::{HttpClient, KeyValueStore, LoginNavigator, Notifier};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// API root used when the host does not provide one.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/";
/// Refresh endpoint, relative to the base URL.
pub const DEFAULT_REFRESH_ENDPOINT: &str = "auth/token/refresh/";
pub const DEFAULT_LOGIN_ROUTE: &str = "/pages/login/login";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Pause between the "session expired" message and the login redirect.
pub const DEFAULT_LOGOUT_REDIRECT_DELAY: Duration = Duration::from_millis(1500);

const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);
const MAX_LOGOUT_REDIRECT_DELAY: Duration = Duration::from_secs(30);

pub const ENV_BASE_URL: &str = "WRONGBOOK_API_BASE_URL";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "WRONGBOOK_REQUEST_TIMEOUT_MS";

/// Core configuration for the wrongbook client core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// API root, always ending in `/`
    pub base_url: Url,

    /// Path of the token refresh endpoint, relative to `base_url`
    pub refresh_endpoint: String,

    /// Route handed to the login navigator on session termination
    pub login_route: String,

    /// Default per-call transport deadline
    pub request_timeout: Duration,

    pub logout_redirect_delay: Duration,

    pub http_client: Arc<dyn HttpClient>,

    /// Backing store for session credentials
    pub credential_storage: Arc<dyn KeyValueStore>,

    pub notifier: Arc<dyn Notifier>,

    pub login_navigator: Arc<dyn LoginNavigator>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("base_url", &self.base_url.as_str())
            .field("refresh_endpoint", &self.refresh_endpoint)
            .field("login_route", &self.login_route)
            .field("request_timeout", &self.request_timeout)
            .field("logout_redirect_delay", &self.logout_redirect_delay)
            .field("http_client", &"HttpClient { ... }")
            .field("credential_storage", &"KeyValueStore { ... }")
            .field("notifier", &"Notifier { ... }")
            .field("login_navigator", &"LoginNavigator { ... }")
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Builder pre-filled from `WRONGBOOK_API_BASE_URL` and
    /// `WRONGBOOK_REQUEST_TIMEOUT_MS`. Unset variables keep the defaults.
    pub fn from_env() -> Result<CoreConfigBuilder> {
        CoreConfigBuilder::default().apply_env(|key| std::env::var(key).ok())
    }

    /// Absolute URL of the refresh endpoint.
    pub fn refresh_url(&self) -> Result<Url> {
        self.endpoint_url(&self.refresh_endpoint)
    }

    /// Resolve an API path against the base URL.
    ///
    /// Leading slashes are ignored so `"/questions/"` and `"questions/"`
    /// address the same endpoint under the API root. Absolute URLs and
    /// dot segments are rejected: the result always stays under `base_url`.
    pub fn endpoint_url(&self, path: &str) -> Result<Url> {
        let invalid = |reason: &str| {
            Error::Config(format!("Invalid endpoint path '{}': {}", path, reason))
        };

        if Url::parse(path).is_ok() {
            return Err(invalid("absolute URLs are not allowed"));
        }

        let relative = path.trim_start_matches(['/', '\\']);
        let route = relative.split(['?', '#']).next().unwrap_or(relative);
        if route.split(['/', '\\']).any(is_dot_segment) {
            return Err(invalid("dot segments are not allowed"));
        }

        let url = self
            .base_url
            .join(relative)
            .map_err(|e| invalid(&e.to_string()))?;

        if url.origin() != self.base_url.origin() || !url.path().starts_with(self.base_url.path())
        {
            return Err(invalid("resolves outside the API base"));
        }
        Ok(url)
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.base_url.scheme(), "http" | "https") {
            return Err(Error::Config(format!(
                "Base URL must use http or https, got '{}'",
                self.base_url.scheme()
            )));
        }

        if self.refresh_endpoint.trim().is_empty() {
            return Err(Error::Config(
                "Refresh endpoint cannot be empty".to_string(),
            ));
        }

        if self.login_route.trim().is_empty() {
            return Err(Error::Config("Login route cannot be empty".to_string()));
        }

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than 0ms".to_string(),
            ));
        }

        if self.request_timeout > MAX_REQUEST_TIMEOUT {
            return Err(Error::Config(
                "Request timeout exceeds maximum of 5 minutes".to_string(),
            ));
        }

        if self.logout_redirect_delay > MAX_LOGOUT_REDIRECT_DELAY {
            return Err(Error::Config(
                "Logout redirect delay exceeds maximum of 30 seconds".to_string(),
            ));
        }

        Ok(())
    }
}

/// `.` or `..`, including their percent-encoded spellings.
fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}

/// Parse and normalise an API root so relative joins stay beneath it.
fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(Error::Config("Base URL cannot be empty".to_string()));
    }

    let mut url =
        Url::parse(trimmed).map_err(|e| Error::Config(format!("Invalid base URL '{}': {}", trimmed, e)))?;

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}

#[cfg(not(feature = "desktop-shims"))]
fn capability_missing(capability: &str, message: &str) -> Error {
    Error::CapabilityMissing {
        capability: capability.to_string(),
        message: message.to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::with_timeout(timeout));
    Ok(client)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    Err(capability_missing(
        "HttpClient",
        "HttpClient implementation is required to reach the API. \
         Desktop: enable the 'desktop-shims' feature to use the reqwest client. \
         H5 / mini-program: inject the host request bridge.",
    ))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_credential_storage() -> Result<Arc<dyn KeyValueStore>> {
    use bridge_desktop::KeyringKeyValueStore;

    let store: Arc<dyn KeyValueStore> = Arc::new(KeyringKeyValueStore::new());
    Ok(store)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_credential_storage() -> Result<Arc<dyn KeyValueStore>> {
    Err(capability_missing(
        "KeyValueStore",
        "KeyValueStore implementation is required for session credentials. \
         Desktop: enable the 'desktop-shims' feature to use the keyring store. \
         H5 / mini-program: inject the host storage bridge.",
    ))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_login_navigator() -> Result<Arc<dyn LoginNavigator>> {
    use bridge_desktop::LoggingNavigator;

    let navigator: Arc<dyn LoginNavigator> = Arc::new(LoggingNavigator);
    Ok(navigator)
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_login_navigator() -> Result<Arc<dyn LoginNavigator>> {
    Err(capability_missing(
        "LoginNavigator",
        "LoginNavigator implementation is required to leave an expired session. \
         Inject the host router bridge.",
    ))
}

#[cfg(feature = "desktop-shims")]
fn provide_default_notifier() -> Arc<dyn Notifier> {
    Arc::new(bridge_desktop::ConsoleNotifier::default())
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_notifier() -> Arc<dyn Notifier> {
    Arc::new(bridge_traits::SilentNotifier)
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    base_url: Option<String>,
    refresh_endpoint: Option<String>,
    login_route: Option<String>,
    request_timeout: Option<Duration>,
    logout_redirect_delay: Option<Duration>,
    http_client: Option<Arc<dyn HttpClient>>,
    credential_storage: Option<Arc<dyn KeyValueStore>>,
    notifier: Option<Arc<dyn Notifier>>,
    login_navigator: Option<Arc<dyn LoginNavigator>>,
}

impl CoreConfigBuilder {
    /// Sets the API root (default `http://127.0.0.1:8000/api/`).
    ///
    /// ```
    /// use core_runtime::config::CoreConfig;
    ///
    /// let builder = CoreConfig::builder().base_url("https://wrongbook.example.com/api");
    /// ```
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn refresh_endpoint(mut self, path: impl Into<String>) -> Self {
        self.refresh_endpoint = Some(path.into());
        self
    }

    pub fn login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = Some(route.into());
        self
    }

    /// Default transport deadline; individual requests may override it.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn logout_redirect_delay(mut self, delay: Duration) -> Self {
        self.logout_redirect_delay = Some(delay);
        self
    }

    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn credential_storage(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.credential_storage = Some(store);
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn login_navigator(mut self, navigator: Arc<dyn LoginNavigator>) -> Self {
        self.login_navigator = Some(navigator);
        self
    }

    /// Overlay environment values read through `lookup`.
    ///
    /// Split out from [`CoreConfig::from_env`] so tests never touch the
    /// process environment.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.base_url = Some(url);
        }

        if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT_MS) {
            let millis: u64 = raw.trim().parse().map_err(|_| {
                Error::Config(format!(
                    "{} must be a whole number of milliseconds, got '{}'",
                    ENV_REQUEST_TIMEOUT_MS, raw
                ))
            })?;
            self.request_timeout = Some(Duration::from_millis(millis));
        }

        Ok(self)
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// Fails if a required bridge is missing and cannot be defaulted, or if
    /// any value is out of range.
    pub fn build(self) -> Result<CoreConfig> {
        let base_url = parse_base_url(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;
        let request_timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(request_timeout)?,
        };

        let credential_storage = match self.credential_storage {
            Some(store) => store,
            None => provide_default_credential_storage()?,
        };

        let login_navigator = match self.login_navigator {
            Some(navigator) => navigator,
            None => provide_default_login_navigator()?,
        };

        let config = CoreConfig {
            base_url,
            refresh_endpoint: self
                .refresh_endpoint
                .unwrap_or_else(|| DEFAULT_REFRESH_ENDPOINT.to_string()),
            login_route: self
                .login_route
                .unwrap_or_else(|| DEFAULT_LOGIN_ROUTE.to_string()),
            request_timeout,
            logout_redirect_delay: self
                .logout_redirect_delay
                .unwrap_or(DEFAULT_LOGOUT_REDIRECT_DELAY),
            http_client,
            credential_storage,
            notifier: self.notifier.unwrap_or_else(provide_default_notifier),
            login_navigator,
        };

        config.validate()?;

        Ok(config)
    }
}
