//! Session termination.
//!
//! Runs when a session cannot be recovered: the refresh token is missing,
//! the refresh call failed, or the refresh endpoint itself answered 401.
//!
//! Order of effects:
//! 1. stored credentials (tokens and user snapshot) are cleared
//! 2. the user is told the session expired
//! 3. `SessionTerminated` is published
//! 4. after `redirect_delay`, the host navigates to the login route and
//!    `LoginRequired` is published
//!
//! The delay gives the notification time to be read before the view changes.

use crate::credentials::CredentialStore;
use bridge_traits::platform::{LoginNavigator, Notifier};
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired, please log in again";

/// Why a session was terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationReason {
    /// A 401 arrived and no refresh token was stored.
    MissingRefreshToken,
    /// The refresh call failed (non-2xx, transport error, malformed body).
    RefreshFailed,
    /// A request to the refresh endpoint itself was answered with 401.
    RefreshEndpointUnauthorized,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationReason::MissingRefreshToken => "missing_refresh_token",
            TerminationReason::RefreshFailed => "refresh_failed",
            TerminationReason::RefreshEndpointUnauthorized => "refresh_endpoint_unauthorized",
        }
    }
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone)]
pub struct SessionTerminator {
    credentials: CredentialStore,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn LoginNavigator>,
    event_bus: EventBus,
    login_route: String,
    redirect_delay: Duration,
}

impl SessionTerminator {
    pub fn new(
        credentials: CredentialStore,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn LoginNavigator>,
        event_bus: EventBus,
        login_route: impl Into<String>,
        redirect_delay: Duration,
    ) -> Self {
        Self {
            credentials,
            notifier,
            navigator,
            event_bus,
            login_route: login_route.into(),
            redirect_delay,
        }
    }

    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    /// End the session.
    ///
    /// Credential clearing and the notification happen before this returns.
    /// The redirect runs on a spawned task; the returned handle completes
    /// once the navigator has been called.
    #[instrument(skip(self), fields(reason = %reason))]
    pub async fn terminate(&self, reason: TerminationReason) -> JoinHandle<()> {
        if let Err(e) = self.credentials.clear().await {
            warn!(error = %e, "Failed to clear credentials during session termination");
        }

        self.notifier.notify(SESSION_EXPIRED_MESSAGE);

        info!("Session terminated");
        let _ = self
            .event_bus
            .emit(CoreEvent::Auth(AuthEvent::SessionTerminated {
                reason: reason.as_str().to_string(),
            }));

        let navigator = Arc::clone(&self.navigator);
        let event_bus = self.event_bus.clone();
        let route = self.login_route.clone();
        let delay = self.redirect_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = navigator.navigate_to_login(&route).await {
                warn!(error = %e, route = %route, "Login navigation failed");
            }
            let _ = event_bus.emit(CoreEvent::Auth(AuthEvent::LoginRequired { route }));
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_desktop::MemoryKeyValueStore;
    use bridge_traits::error::Result as BridgeResult;
    use bridge_traits::storage::KeyValueStore;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, message: &str) {
            self.messages.lock().unwrap().push(message.to_string());
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        routes: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LoginNavigator for RecordingNavigator {
        async fn navigate_to_login(&self, route: &str) -> BridgeResult<()> {
            self.routes.lock().unwrap().push(route.to_string());
            Ok(())
        }
    }

    struct Fixture {
        backing: Arc<MemoryKeyValueStore>,
        notifier: Arc<RecordingNotifier>,
        navigator: Arc<RecordingNavigator>,
        event_bus: EventBus,
        terminator: SessionTerminator,
    }

    fn fixture() -> Fixture {
        let backing = Arc::new(MemoryKeyValueStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::default());
        let event_bus = EventBus::new(16);
        let terminator = SessionTerminator::new(
            CredentialStore::new(backing.clone()),
            notifier.clone(),
            navigator.clone(),
            event_bus.clone(),
            "/pages/login/login",
            Duration::from_millis(1500),
        );
        Fixture {
            backing,
            notifier,
            navigator,
            event_bus,
            terminator,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminate_clears_notifies_then_redirects_after_delay() {
        let f = fixture();
        f.backing.set("access_token", "T1").await.unwrap();
        f.backing.set("refresh_token", "R1").await.unwrap();
        f.backing.set("user", "{}").await.unwrap();
        let mut events = f.event_bus.subscribe();

        let redirect = f.terminator.terminate(TerminationReason::RefreshFailed).await;

        assert!(f.backing.is_empty().await);
        assert_eq!(
            f.notifier.messages.lock().unwrap().as_slice(),
            [SESSION_EXPIRED_MESSAGE.to_string()]
        );
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Auth(AuthEvent::SessionTerminated {
                reason: "refresh_failed".to_string()
            })
        );

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(f.navigator.routes.lock().unwrap().is_empty());

        redirect.await.unwrap();
        assert_eq!(
            f.navigator.routes.lock().unwrap().as_slice(),
            ["/pages/login/login".to_string()]
        );
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Auth(AuthEvent::LoginRequired {
                route: "/pages/login/login".to_string()
            })
        );
    }

    #[test]
    fn test_reason_labels() {
        assert_eq!(
            TerminationReason::MissingRefreshToken.to_string(),
            "missing_refresh_token"
        );
        assert_eq!(
            TerminationReason::RefreshEndpointUnauthorized.as_str(),
            "refresh_endpoint_unauthorized"
        );
    }
}
