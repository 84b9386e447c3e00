//! # Request Gateway
//!
//! Single entry point for API calls. Each call:
//!
//! 1. resolves the path against the configured API base
//! 2. attaches `Authorization: Bearer <access token>` read fresh from storage
//! 3. sends GET/HEAD data as query parameters and everything else as JSON
//! 4. sends one exchange through the host transport, bounded by a deadline
//! 5. routes the outcome:
//!    - 200 / 201: parsed body (204 yields `null`)
//!    - 401: token recovery through [`RefreshCoordinator`]
//!    - anything else: [`RequestError::RequestFailed`] plus one user notification
//!    - transport fault: [`RequestError::NetworkFailure`] plus one user notification

use crate::classify;
use crate::coordinator::{RefreshCoordinator, Replayer};
use crate::error::{RequestError, Result};
use crate::request::{query_pairs, ApiRequest};
use async_trait::async_trait;
use bridge_traits::http::{HttpRequest, HttpResponse};
use core_auth::{CredentialStore, SessionTerminator, TerminationReason, TokenRefresher};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus, RequestEvent};
use serde_json::Value;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

struct GatewayInner {
    config: CoreConfig,
    credentials: CredentialStore,
    terminator: SessionTerminator,
    coordinator: Arc<RefreshCoordinator>,
    event_bus: EventBus,
}

/// Authenticated request gateway. Cheap to clone; clones share the
/// refresh state.
#[derive(Clone)]
pub struct RequestGateway {
    inner: Arc<GatewayInner>,
}

impl RequestGateway {
    pub fn new(config: CoreConfig, event_bus: EventBus) -> core_runtime::Result<Self> {
        let credentials = CredentialStore::new(Arc::clone(&config.credential_storage));
        let refresher = TokenRefresher::new(
            Arc::clone(&config.http_client),
            config.refresh_url()?,
            config.request_timeout,
        );
        let terminator = SessionTerminator::new(
            credentials.clone(),
            Arc::clone(&config.notifier),
            Arc::clone(&config.login_navigator),
            event_bus.clone(),
            config.login_route.clone(),
            config.logout_redirect_delay,
        );
        let coordinator = Arc::new(RefreshCoordinator::new(
            refresher,
            credentials.clone(),
            terminator.clone(),
            event_bus.clone(),
        ));

        Ok(Self {
            inner: Arc::new(GatewayInner {
                config,
                credentials,
                terminator,
                coordinator,
                event_bus,
            }),
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.inner.config
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.inner.credentials
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.inner.event_bus
    }

    pub fn session_terminator(&self) -> &SessionTerminator {
        &self.inner.terminator
    }

    pub async fn is_refreshing(&self) -> bool {
        self.inner.coordinator.is_refreshing().await
    }

    /// Issue `request` and return the parsed response body.
    #[instrument(skip(self, request), fields(method = %request.method, path = %request.path))]
    pub async fn request(&self, request: ApiRequest) -> Result<Value> {
        let (response, sent_token) = match self.send(&request).await {
            Ok(sent) => sent,
            Err(error) => {
                self.report_failure(&request, &error);
                return Err(error);
            }
        };

        debug!(status = response.status, replay = request.is_replay(), "Response received");

        match response.status {
            200 | 201 | 204 => Ok(classify::success_body(&response.body)),
            401 if self.is_refresh_endpoint(&request.path) => {
                warn!("Refresh endpoint rejected the refresh token");
                let _ = self
                    .inner
                    .terminator
                    .terminate(TerminationReason::RefreshEndpointUnauthorized)
                    .await;
                Err(RequestError::RefreshExhausted {
                    message: classify::response_message(401, &response.body),
                })
            }
            401 if request.authenticated => self.recover(request, response, sent_token).await,
            status => {
                let error = classify::request_failed(status, &response.body);
                self.report_failure(&request, &error);
                Err(error)
            }
        }
    }

    async fn recover(
        &self,
        request: ApiRequest,
        response: HttpResponse,
        sent_token: Option<String>,
    ) -> Result<Value> {
        let unauthorized = classify::unauthorized(response.status, response.body);

        // A fresh token was just rejected; refreshing again would loop.
        if request.is_replay() {
            warn!("Replayed request rejected after token refresh");
            self.report_failure(&request, &unauthorized);
            return Err(unauthorized);
        }

        // The token was replaced while this request was in flight.
        if let (Some(sent), Some(current)) = (sent_token, self.access_token().await) {
            if sent != current {
                debug!("Access token changed since send, replaying with the stored one");
                return self.replay(request.into_replay()).await;
            }
        }

        self.inner
            .coordinator
            .enqueue_or_refresh(request, unauthorized, self.clone())
            .await
    }

    /// Send one exchange; also returns the bearer token it carried.
    async fn send(&self, request: &ApiRequest) -> Result<(HttpResponse, Option<String>)> {
        let config = &self.inner.config;

        let mut url = config
            .endpoint_url(&request.path)
            .map_err(|e| RequestError::InvalidRequest(e.to_string()))?;

        if request.method.uses_query() {
            if let Some(data) = &request.data {
                let pairs = query_pairs(data);
                if !pairs.is_empty() {
                    url.query_pairs_mut().extend_pairs(pairs);
                }
            }
        }

        let deadline = request.timeout.unwrap_or(config.request_timeout);
        let mut http = HttpRequest::new(request.method, url.as_str())
            .header("Content-Type", "application/json")
            .timeout(deadline);

        for (key, value) in &request.headers {
            http = http.header(key.clone(), value.clone());
        }

        if !request.method.uses_query() {
            if let Some(data) = &request.data {
                http = http
                    .json(data)
                    .map_err(|e| RequestError::InvalidRequest(e.to_string()))?;
            }
        }

        let mut sent_token = None;
        if request.authenticated {
            if let Some(token) = self.access_token().await {
                http.headers
                    .retain(|key, _| !key.eq_ignore_ascii_case("authorization"));
                http = http.bearer_token(token.as_str());
                sent_token = Some(token);
            }
        }

        match timeout(deadline, config.http_client.execute(http)).await {
            Ok(Ok(response)) => Ok((response, sent_token)),
            Ok(Err(e)) => {
                warn!(error = %e, "Transport failure");
                Err(classify::network_failure(&e))
            }
            Err(_) => {
                warn!(timeout_ms = deadline.as_millis() as u64, "Request timed out");
                Err(classify::timeout_failure())
            }
        }
    }

    async fn access_token(&self) -> Option<String> {
        match self.inner.credentials.access_token().await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Could not read access token, sending without it");
                None
            }
        }
    }

    fn is_refresh_endpoint(&self, path: &str) -> bool {
        let endpoint = route_of(&self.inner.config.refresh_endpoint);
        !endpoint.is_empty() && route_of(path) == endpoint
    }

    fn report_failure(&self, request: &ApiRequest, error: &RequestError) {
        warn!(
            path = %request.path,
            status = ?error.status(),
            error = %error,
            "Request failed"
        );

        if matches!(error, RequestError::InvalidRequest(_)) {
            return;
        }

        self.inner.config.notifier.notify(error.message());
        let _ = self
            .inner
            .event_bus
            .emit(CoreEvent::Request(RequestEvent::Failed {
                path: request.path.clone(),
                status: error.status(),
                message: error.message().to_string(),
            }));
    }
}

#[async_trait]
impl Replayer for RequestGateway {
    async fn replay(&self, request: ApiRequest) -> Result<Value> {
        self.request(request).await
    }
}

/// API path without surrounding slashes, query or fragment.
fn route_of(path: &str) -> &str {
    let route = path.split(['?', '#']).next().unwrap_or(path);
    route.trim_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_of_normalises_slashes_and_query() {
        assert_eq!(route_of("/auth/token/refresh/"), "auth/token/refresh");
        assert_eq!(route_of("auth/token/refresh?x=1"), "auth/token/refresh");
        assert_eq!(route_of("x/auth/token/refresh/extra"), "x/auth/token/refresh/extra");
    }
}
