use core_request::{ApiRequest, RequestGateway};
use serde_json::{json, Value};

use crate::error::Result;

const SEARCH_LIST: &str = "search/search-list/";
const SEARCH_SUGGESTIONS: &str = "search/search-suggestions/";
const SEARCH_HISTORY: &str = "search/search-history/";
const HISTORY: &str = "search/history/";
const HISTORY_CLEAR: &str = "search/history/clear/";

/// Full-text search over the user's questions.
#[derive(Clone)]
pub struct SearchApi {
    gateway: RequestGateway,
}

impl SearchApi {
    pub fn new(gateway: RequestGateway) -> Self {
        Self { gateway }
    }

    #[tracing::instrument(skip(self))]
    pub async fn search(&self, keyword: &str, page: u32) -> Result<Value> {
        let request =
            ApiRequest::get(SEARCH_LIST).with_data(json!({ "query": keyword, "page": page }));
        Ok(self.gateway.request(request).await?)
    }

    /// Type-ahead suggestions for a partial keyword.
    pub async fn suggestions(&self, keyword: &str) -> Result<Value> {
        let request = ApiRequest::get(SEARCH_SUGGESTIONS).with_data(json!({ "q": keyword }));
        Ok(self.gateway.request(request).await?)
    }

    /// The user's past searches.
    pub async fn history(&self) -> Result<Value> {
        Ok(self.gateway.request(ApiRequest::get(HISTORY)).await?)
    }

    /// Run a search and have the server add it to the history.
    pub async fn record_history(&self, keyword: &str) -> Result<Value> {
        let request = ApiRequest::post(SEARCH_HISTORY).with_data(json!({ "query": keyword }));
        Ok(self.gateway.request(request).await?)
    }

    pub async fn clear_history(&self) -> Result<()> {
        self.gateway.request(ApiRequest::post(HISTORY_CLEAR)).await?;
        Ok(())
    }
}
