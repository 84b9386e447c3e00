//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the wrongbook client core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//!
//! Every other core crate depends on this one for its config type, its
//! logging conventions and the session event stream.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;

pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};
