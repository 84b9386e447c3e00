//! Core service façade and bootstrap helpers.
//!
//! This crate wires a validated [`CoreConfig`] into a [`RequestGateway`] and
//! exposes the wrongbook backend as typed API handles. Desktop apps
//! typically enable the `desktop-shims` feature (which depends on
//! `bridge-desktop`) and call [`bootstrap_desktop`]; other hosts build a
//! `CoreConfig` with their own bridges and call [`CoreService::new`].
//!
//! ```ignore
//! let core = core_service::bootstrap_desktop()?;
//! core.auth().login("alice", "secret").await?;
//! let page = core.questions().list(&QuestionQuery::page(1)).await?;
//! ```

pub mod api;
pub mod error;

pub use api::{
    AnswersApi, AuthApi, CategoriesApi, QuestionQuery, QuestionsApi, RegisterForm, SearchApi,
};
pub use error::{CoreError, Result};

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop;

use core_request::{ApiRequest, RequestGateway};
use core_runtime::config::CoreConfig;
use core_runtime::events::{EventBus, EventStream};
use serde_json::Value;

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    gateway: RequestGateway,
}

impl CoreService {
    /// Create a service with a fresh event bus.
    pub fn new(config: CoreConfig) -> Result<Self> {
        Self::with_event_bus(config, EventBus::default())
    }

    /// Create a service that publishes on an existing event bus.
    pub fn with_event_bus(config: CoreConfig, event_bus: EventBus) -> Result<Self> {
        let gateway = RequestGateway::new(config, event_bus)?;
        tracing::info!(
            base_url = %gateway.config().base_url,
            "Core service initialised"
        );
        Ok(Self { gateway })
    }

    pub fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }

    pub fn config(&self) -> &CoreConfig {
        self.gateway.config()
    }

    pub fn event_bus(&self) -> &EventBus {
        self.gateway.event_bus()
    }

    /// New subscription to auth and request events.
    pub fn events(&self) -> EventStream {
        EventStream::new(self.gateway.event_bus().subscribe())
    }

    /// Send an arbitrary request through the gateway.
    pub async fn request(&self, request: ApiRequest) -> Result<Value> {
        Ok(self.gateway.request(request).await?)
    }

    pub fn auth(&self) -> AuthApi {
        AuthApi::new(self.gateway.clone())
    }

    pub fn questions(&self) -> QuestionsApi {
        QuestionsApi::new(self.gateway.clone())
    }

    pub fn categories(&self) -> CategoriesApi {
        CategoriesApi::new(self.gateway.clone())
    }

    pub fn answers(&self) -> AnswersApi {
        AnswersApi::new(self.gateway.clone())
    }

    pub fn search(&self) -> SearchApi {
        SearchApi::new(self.gateway.clone())
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// Reads `WRONGBOOK_API_BASE_URL` and `WRONGBOOK_REQUEST_TIMEOUT_MS` and fills
/// every bridge with the `bridge-desktop` defaults.
#[cfg(feature = "desktop-shims")]
pub fn bootstrap_desktop() -> Result<CoreService> {
    let config = CoreConfig::from_env()?.build()?;
    CoreService::new(config)
}
