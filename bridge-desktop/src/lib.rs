//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop hosts
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `KeyValueStore` using the OS keychain via `keyring`, plus an in-memory
//!   store for ephemeral sessions
//! - `Notifier` printing to stderr and mirroring into `tracing`
//! - `LoginNavigator` that records the redirect in the log; desktop shells
//!   replace it with their own window routing
//!
//! ## Feature Flags
//!
//! - `secure-store`: Enable OS keychain integration (default)
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ConsoleNotifier, KeyringKeyValueStore, ReqwestHttpClient};
//!
//! let http_client = ReqwestHttpClient::new();
//! let storage = KeyringKeyValueStore::new();
//! let notifier = ConsoleNotifier::default();
//! ```

mod http;
mod memory;
mod notifier;

#[cfg(feature = "secure-store")]
mod secure_store;

pub use http::ReqwestHttpClient;
pub use memory::MemoryKeyValueStore;
pub use notifier::{ConsoleNotifier, LoggingNavigator};

#[cfg(feature = "secure-store")]
pub use secure_store::KeyringKeyValueStore;
