//! # Refresh Coordination
//!
//! Turns any number of concurrent 401s into a single refresh call.
//!
//! ## States
//!
//! ```text
//!            first 401 (refresh token present)
//!   Idle ─────────────────────────────────────▶ Refreshing { queue }
//!    ▲                                              │  further 401s are queued
//!    └──────────── refresh settles ─────────────────┘
//!         success: persist tokens, replay queue then originator
//!         failure: terminate session, reject queue then originator
//! ```
//!
//! The refresh runs on its own task, so a caller that stops waiting cannot
//! leave the coordinator stuck in `Refreshing`. Queued requests are always
//! replayed or rejected, even if nobody is listening for the result.

use crate::error::{RequestError, Result};
use crate::request::ApiRequest;
use async_trait::async_trait;
use core_auth::{CredentialStore, SessionTerminator, TerminationReason, TokenRefresher};
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use futures::stream::{FuturesOrdered, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tracing::{debug, info, instrument, warn};

/// Re-issues a request once fresh credentials are stored.
#[async_trait]
pub trait Replayer: Send + Sync {
    async fn replay(&self, request: ApiRequest) -> Result<Value>;
}

/// A request parked until the in-flight refresh settles.
struct PendingRequest {
    request: ApiRequest,
    reply: oneshot::Sender<Result<Value>>,
}

enum RefreshState {
    Idle,
    Refreshing { queue: Vec<PendingRequest> },
}

pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
    refresher: TokenRefresher,
    credentials: CredentialStore,
    terminator: SessionTerminator,
    event_bus: EventBus,
}

impl RefreshCoordinator {
    pub fn new(
        refresher: TokenRefresher,
        credentials: CredentialStore,
        terminator: SessionTerminator,
        event_bus: EventBus,
    ) -> Self {
        Self {
            state: Mutex::new(RefreshState::Idle),
            refresher,
            credentials,
            terminator,
            event_bus,
        }
    }

    /// Whether a refresh call is outstanding.
    pub async fn is_refreshing(&self) -> bool {
        matches!(*self.state.lock().await, RefreshState::Refreshing { .. })
    }

    /// Number of requests waiting on the outstanding refresh.
    pub async fn queued(&self) -> usize {
        match &*self.state.lock().await {
            RefreshState::Idle => 0,
            RefreshState::Refreshing { queue } => queue.len(),
        }
    }

    /// Recover from a 401 on `request`.
    ///
    /// `unauthorized` is the error built from that 401; it becomes the
    /// result for the whole cohort if recovery fails. Resolves with the
    /// replayed response once the shared refresh succeeds.
    #[instrument(skip_all, fields(path = %request.path))]
    pub async fn enqueue_or_refresh<R>(
        self: &Arc<Self>,
        request: ApiRequest,
        unauthorized: RequestError,
        replayer: R,
    ) -> Result<Value>
    where
        R: Replayer + Clone + 'static,
    {
        let (reply, settled) = oneshot::channel();
        let pending = PendingRequest { request, reply };

        {
            // Held across the token read so only one caller can start a refresh.
            let mut state = self.state.lock().await;
            match &mut *state {
                RefreshState::Refreshing { queue } => {
                    queue.push(pending);
                    debug!(queued = queue.len(), "Refresh in flight, request queued");
                }
                RefreshState::Idle => {
                    let refresh_token = match self.credentials.refresh_token().await {
                        Ok(Some(token)) => token,
                        Ok(None) => {
                            drop(state);
                            info!("401 without a stored refresh token");
                            let _ = self
                                .terminator
                                .terminate(TerminationReason::MissingRefreshToken)
                                .await;
                            return Err(unauthorized);
                        }
                        Err(e) => {
                            drop(state);
                            warn!(error = %e, "Could not read refresh token");
                            let _ = self
                                .terminator
                                .terminate(TerminationReason::MissingRefreshToken)
                                .await;
                            return Err(unauthorized);
                        }
                    };

                    *state = RefreshState::Refreshing { queue: Vec::new() };
                    debug!("Starting token refresh");
                    let coordinator = Arc::clone(self);
                    tokio::spawn(coordinator.run_refresh(
                        refresh_token,
                        pending,
                        unauthorized.clone(),
                        replayer,
                    ));
                }
            }
        }

        settled.await.unwrap_or(Err(unauthorized))
    }

    async fn run_refresh<R>(
        self: Arc<Self>,
        refresh_token: String,
        originator: PendingRequest,
        unauthorized: RequestError,
        replayer: R,
    ) where
        R: Replayer + Clone + 'static,
    {
        let _ = self
            .event_bus
            .emit(CoreEvent::Auth(AuthEvent::TokenRefreshing));

        let outcome = match self.refresher.refresh(&refresh_token).await {
            Ok(tokens) => self
                .credentials
                .apply_refresh(&tokens)
                .await
                .map(|()| tokens),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(tokens) => {
                let queue = self.drain().await;
                info!(replayed = queue.len() + 1, "Token refreshed, replaying requests");
                let _ = self
                    .event_bus
                    .emit(CoreEvent::Auth(AuthEvent::TokenRefreshed {
                        rotated_refresh_token: tokens.refresh_token.is_some(),
                        replayed: queue.len() + 1,
                    }));

                // Replays are issued in queue order with the originator last,
                // then run concurrently.
                let mut replays: FuturesOrdered<_> = queue
                    .into_iter()
                    .chain(std::iter::once(originator))
                    .map(|pending| {
                        let replayer = replayer.clone();
                        async move {
                            let result = replayer.replay(pending.request.into_replay()).await;
                            let _ = pending.reply.send(result);
                        }
                    })
                    .collect();
                while replays.next().await.is_some() {}
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, ending session");
                // Still `Refreshing` here, so 401s arriving meanwhile queue up
                // instead of terminating the session again.
                for pending in self.take_queue().await {
                    let _ = pending.reply.send(Err(unauthorized.clone()));
                }
                let _ = self
                    .terminator
                    .terminate(TerminationReason::RefreshFailed)
                    .await;
                let _ = originator.reply.send(Err(unauthorized.clone()));
                for pending in self.drain().await {
                    let _ = pending.reply.send(Err(unauthorized.clone()));
                }
            }
        }
    }

    /// Take the queued requests without leaving `Refreshing`.
    async fn take_queue(&self) -> Vec<PendingRequest> {
        match &mut *self.state.lock().await {
            RefreshState::Refreshing { queue } => std::mem::take(queue),
            RefreshState::Idle => Vec::new(),
        }
    }

    /// Take every queued request and return to `Idle` in one step.
    async fn drain(&self) -> Vec<PendingRequest> {
        let mut state = self.state.lock().await;
        match std::mem::replace(&mut *state, RefreshState::Idle) {
            RefreshState::Refreshing { queue } => queue,
            RefreshState::Idle => Vec::new(),
        }
    }
}
