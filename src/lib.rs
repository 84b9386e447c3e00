//! Workspace umbrella crate.
//!
//! Exposes the feature flags that wire the individual workspace crates
//! together. Host applications can depend on `wrongbook-workspace`, keep the
//! default `desktop-shims` feature, and reach the client core through
//! [`core_service`].

#[cfg(feature = "desktop-shims")]
pub use core_service;
