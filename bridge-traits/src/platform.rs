//! Host UI hooks the core calls into.
//!
//! The core never renders anything. When a user has to be told about a
//! failure it calls [`Notifier`]; when the session is gone it asks the host to
//! show the login view through [`LoginNavigator`].

use async_trait::async_trait;

use crate::error::Result;

/// Fire-and-forget user-visible message (toast, banner, status line).
///
/// Implementations must return quickly and must not fail; anything slow
/// should be handed off to the host's own UI queue.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str);
}

/// Navigation to the host's login view.
#[async_trait]
pub trait LoginNavigator: Send + Sync {
    /// Replace the current view stack with the login route.
    async fn navigate_to_login(&self, route: &str) -> Result<()>;
}

/// Notifier that drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _message: &str) {}
}
