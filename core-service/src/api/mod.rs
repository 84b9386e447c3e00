//! Typed handles over the wrongbook REST endpoints.
//!
//! Every call goes through [`RequestGateway::request`](core_request::RequestGateway::request),
//! so bearer tokens, refresh and failure reporting apply uniformly.

pub mod answers;
pub mod auth;
pub mod categories;
pub mod questions;
pub mod search;

pub use answers::AnswersApi;
pub use auth::{AuthApi, RegisterForm};
pub use categories::CategoriesApi;
pub use questions::{QuestionQuery, QuestionsApi};
pub use search::SearchApi;

use std::fmt::Display;

/// `collection/` joined with a resource id, keeping the trailing slash the
/// backend router expects.
pub(crate) fn detail_path(collection: &str, id: impl Display) -> String {
    format!("{}{}/", collection, id)
}
