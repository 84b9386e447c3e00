//! Refresh endpoint client.
//!
//! Performs the single wire call that exchanges a refresh token for a new
//! access token. Coordination (who may refresh, who waits) lives in the
//! request layer; this type only knows the endpoint contract:
//!
//! ```text
//! POST <base>/auth/token/refresh/      {"refresh": "<refresh token>"}
//! 200 OK                               {"access": "<token>", "refresh"?: "<token>"}
//! ```

use crate::error::{AuthError, Result};
use crate::types::{RefreshedTokens, TokenPair};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, instrument, warn};
use url::Url;

#[derive(Clone)]
pub struct TokenRefresher {
    http_client: Arc<dyn HttpClient>,
    refresh_url: Url,
    timeout: Duration,
}

impl TokenRefresher {
    pub fn new(http_client: Arc<dyn HttpClient>, refresh_url: Url, timeout: Duration) -> Self {
        Self {
            http_client,
            refresh_url,
            timeout,
        }
    }

    pub fn refresh_url(&self) -> &Url {
        &self.refresh_url
    }

    /// Exchange `refresh_token` for a new access token.
    ///
    /// Only 200 and 201 count as success, and the body must carry a
    /// non-empty `access`. Anything else is an error; the caller decides
    /// what that means for the session.
    #[instrument(skip(self, refresh_token), fields(endpoint = %self.refresh_url.path()))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens> {
        let request = HttpRequest::new(HttpMethod::Post, self.refresh_url.as_str())
            .json(&json!({ "refresh": refresh_token }))
            .map_err(|e| AuthError::Serialization(e.to_string()))?
            .timeout(self.timeout);

        debug!("Requesting new access token");

        let response = match timeout(self.timeout, self.http_client.execute(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                warn!(error = %e, "Token refresh transport failure");
                return Err(AuthError::RefreshTransport {
                    timed_out: e.is_timeout(),
                    message: e.to_string(),
                });
            }
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "Token refresh timed out");
                return Err(AuthError::RefreshTransport {
                    message: format!("no response within {}ms", self.timeout.as_millis()),
                    timed_out: true,
                });
            }
        };

        if !matches!(response.status, 200 | 201) {
            warn!(status = response.status, "Token refresh rejected");
            return Err(AuthError::RefreshRejected {
                status: response.status,
            });
        }

        let pair: TokenPair = response
            .json()
            .map_err(|e| AuthError::InvalidRefreshResponse(e.to_string()))?;

        let Some(access) = pair.access_token() else {
            warn!("Token refresh response carried no access token");
            return Err(AuthError::InvalidRefreshResponse(
                "response has no access token".to_string(),
            ));
        };

        let tokens = RefreshedTokens {
            access_token: access.to_string(),
            refresh_token: pair.refresh_token().map(str::to_string),
        };

        debug!(rotated = tokens.refresh_token.is_some(), "Access token refreshed");
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::http::HttpResponse;
    use std::sync::Mutex;

    enum Reply {
        Status(u16, &'static str),
        Fail(fn() -> BridgeError),
        Hang,
    }

    struct ScriptedHttpClient {
        reply: Reply,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedHttpClient {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl HttpClient for ScriptedHttpClient {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
            self.requests.lock().unwrap().push(request);
            match &self.reply {
                Reply::Status(status, body) => Ok(HttpResponse::new(*status, *body)),
                Reply::Fail(make) => Err(make()),
                Reply::Hang => {
                    std::future::pending::<()>().await;
                    unreachable!()
                }
            }
        }
    }

    fn refresher(client: Arc<ScriptedHttpClient>) -> TokenRefresher {
        TokenRefresher::new(
            client,
            Url::parse("http://127.0.0.1:8000/api/auth/token/refresh/").unwrap(),
            Duration::from_secs(10),
        )
    }

    #[tokio::test]
    async fn test_refresh_posts_refresh_token_as_json() {
        let client = ScriptedHttpClient::new(Reply::Status(200, r#"{"access": "T2"}"#));
        let tokens = refresher(client.clone()).refresh("R1").await.unwrap();

        assert_eq!(tokens.access_token, "T2");
        assert_eq!(tokens.refresh_token, None);

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(
            requests[0].url,
            "http://127.0.0.1:8000/api/auth/token/refresh/"
        );
        let body: serde_json::Value =
            serde_json::from_slice(requests[0].body.as_ref().unwrap()).unwrap();
        assert_eq!(body, json!({"refresh": "R1"}));
        assert!(requests[0].authorization().is_none());
    }

    #[tokio::test]
    async fn test_refresh_returns_rotated_token() {
        let client =
            ScriptedHttpClient::new(Reply::Status(200, r#"{"access": "T2", "refresh": "R2"}"#));
        let tokens = refresher(client).refresh("R1").await.unwrap();
        assert_eq!(tokens.refresh_token.as_deref(), Some("R2"));
    }

    #[tokio::test]
    async fn test_refresh_rejected_status() {
        let client = ScriptedHttpClient::new(Reply::Status(401, r#"{"detail": "expired"}"#));
        let result = refresher(client).refresh("R1").await;
        assert!(matches!(result, Err(AuthError::RefreshRejected { status: 401 })));
    }

    #[tokio::test]
    async fn test_refresh_without_access_token_fails() {
        let client = ScriptedHttpClient::new(Reply::Status(200, r#"{"refresh": "R2"}"#));
        let result = refresher(client).refresh("R1").await;
        assert!(matches!(result, Err(AuthError::InvalidRefreshResponse(_))));
    }

    #[tokio::test]
    async fn test_refresh_transport_failure() {
        let client = ScriptedHttpClient::new(Reply::Fail(|| {
            BridgeError::Connection("connection refused".to_string())
        }));
        match refresher(client).refresh("R1").await {
            Err(AuthError::RefreshTransport { timed_out, .. }) => assert!(!timed_out),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_times_out() {
        let client = ScriptedHttpClient::new(Reply::Hang);
        match refresher(client).refresh("R1").await {
            Err(AuthError::RefreshTransport { timed_out, .. }) => assert!(timed_out),
            other => panic!("unexpected result {:?}", other),
        }
    }
}
