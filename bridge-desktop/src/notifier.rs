//! Desktop UI hooks

use async_trait::async_trait;
use bridge_traits::{
    error::Result,
    platform::{LoginNavigator, Notifier},
};
use tracing::{info, warn};

/// Prints user-facing messages to stderr and mirrors them into the log.
#[derive(Debug, Clone, Default)]
pub struct ConsoleNotifier {
    quiet: bool,
}

impl ConsoleNotifier {
    /// Log only; don't write to stderr.
    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        warn!(target: "wrongbook::notice", "{}", message);
        if !self.quiet {
            eprintln!("! {}", message);
        }
    }
}

/// Records login redirects in the log.
#[derive(Debug, Clone, Default)]
pub struct LoggingNavigator;

#[async_trait]
impl LoginNavigator for LoggingNavigator {
    async fn navigate_to_login(&self, route: &str) -> Result<()> {
        info!(route, "Login required, redirecting");
        Ok(())
    }
}
