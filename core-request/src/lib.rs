//! # Core Request Module
//!
//! Authenticated request gateway for the wrongbook API.
//!
//! ## Overview
//!
//! - [`RequestGateway`] attaches the bearer token, sends the call and routes
//!   the response
//! - [`RefreshCoordinator`] makes concurrent 401s share one refresh call and
//!   replays or rejects the waiting requests together
//! - [`classify`] maps statuses, error bodies and transport faults to
//!   user-facing messages
//! - [`RequestError`] is the closed set of failures a caller can see
//!
//! ## Usage
//!
//! ```ignore
//! use core_request::{ApiRequest, RequestGateway};
//! use serde_json::json;
//!
//! let gateway = RequestGateway::new(config, event_bus)?;
//! let questions = gateway
//!     .request(ApiRequest::get("questions/questions/").with_data(json!({"page": 1})))
//!     .await?;
//! ```

pub mod classify;
pub mod coordinator;
pub mod dispatcher;
pub mod error;
pub mod request;

pub use coordinator::{RefreshCoordinator, Replayer};
pub use dispatcher::RequestGateway;
pub use error::{NetworkFailureKind, RequestError, Result};
pub use request::ApiRequest;
