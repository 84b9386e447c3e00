use bridge_traits::http::HttpMethod;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use crate::error::{RequestError, Result};

/// A call through the gateway, described relative to the API base.
///
/// ```
/// use core_request::ApiRequest;
/// use serde_json::json;
///
/// let request = ApiRequest::get("questions/questions/")
///     .with_data(json!({"category": 4, "page": 2}));
/// assert_eq!(request.path, "questions/questions/");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// Path under the API base, e.g. `questions/questions/12/`.
    pub path: String,
    pub method: HttpMethod,
    /// Query parameters for GET/HEAD, JSON body otherwise.
    pub data: Option<Value>,
    /// Extra headers; `Authorization` is always set by the gateway.
    pub headers: HashMap<String, String>,
    /// Overrides the configured transport deadline.
    pub timeout: Option<Duration>,
    /// When false, no bearer token is attached and a 401 is an ordinary
    /// failure instead of a refresh trigger.
    pub authenticated: bool,
    replay: bool,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method,
            data: None,
            headers: HashMap::new(),
            timeout: None,
            authenticated: true,
            replay: false,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Serialise `payload` into the request data.
    pub fn with_json<T: Serialize>(self, payload: &T) -> Result<Self> {
        let data = serde_json::to_value(payload)
            .map_err(|e| RequestError::InvalidRequest(format!("payload: {}", e)))?;
        Ok(self.with_data(data))
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Send without credentials (login, registration).
    pub fn anonymous(mut self) -> Self {
        self.authenticated = false;
        self
    }

    /// Whether this is the re-issue of a request after a token refresh.
    pub fn is_replay(&self) -> bool {
        self.replay
    }

    pub(crate) fn into_replay(mut self) -> Self {
        self.replay = true;
        self
    }
}

/// Render request data as query pairs.
///
/// Objects expand to one pair per field, arrays repeat the key, `null`
/// fields are dropped and nested objects are sent as JSON text.
pub(crate) fn query_pairs(data: &Value) -> Vec<(String, String)> {
    let Value::Object(fields) = data else {
        return Vec::new();
    };

    let mut pairs = Vec::new();
    for (key, value) in fields {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = scalar_text(item) {
                        pairs.push((key.clone(), text));
                    }
                }
            }
            other => {
                if let Some(text) = scalar_text(other) {
                    pairs.push((key.clone(), text));
                }
            }
        }
    }
    pairs
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested => Some(nested.to_string()),
    }
}
