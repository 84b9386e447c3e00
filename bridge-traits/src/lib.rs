//! # Host Bridge Traits
//!
//! Capability contracts between the wrongbook client core and the host it
//! runs in (desktop shell, H5 page, mini-program).
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Single-exchange HTTP transport
//! - [`KeyValueStore`](storage::KeyValueStore) - Persistent storage for session credentials
//! - [`Notifier`](platform::Notifier) - Fire-and-forget user-visible messages
//! - [`LoginNavigator`](platform::LoginNavigator) - Redirect to the login view
//! - [`LoggerSink`](log::LoggerSink) - Forward structured logs to host logging
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Transports must
//! report deadline overruns as `BridgeError::Timeout` so callers can tell a
//! timeout from other network faults.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so a single implementation can be
//! shared across every in-flight request.

pub mod error;
pub mod http;
pub mod log;
pub mod platform;
pub mod storage;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use log::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
pub use platform::{LoginNavigator, Notifier, SilentNotifier};
pub use storage::KeyValueStore;
