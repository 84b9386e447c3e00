use core_request::{ApiRequest, RequestGateway};
use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;

use super::detail_path;
use crate::error::Result;

const QUESTIONS: &str = "questions/questions/";

/// Filters accepted by the question list endpoint.
///
/// Unset fields are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuestionQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_solved: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_marked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ordering: Option<String>,
}

impl QuestionQuery {
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }

    pub fn with_subject(mut self, subject: i64) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn solved(mut self, is_solved: bool) -> Self {
        self.is_solved = Some(is_solved);
        self
    }

    pub fn ordering(mut self, ordering: impl Into<String>) -> Self {
        self.ordering = Some(ordering.into());
        self
    }
}

/// CRUD over the user's error questions.
#[derive(Clone)]
pub struct QuestionsApi {
    gateway: RequestGateway,
}

impl QuestionsApi {
    pub fn new(gateway: RequestGateway) -> Self {
        Self { gateway }
    }

    /// One page of questions; the server pages by 20.
    pub async fn list(&self, query: &QuestionQuery) -> Result<Value> {
        let request = ApiRequest::get(QUESTIONS).with_json(query)?;
        Ok(self.gateway.request(request).await?)
    }

    pub async fn get(&self, id: impl Display) -> Result<Value> {
        Ok(self
            .gateway
            .request(ApiRequest::get(detail_path(QUESTIONS, id)))
            .await?)
    }

    pub async fn create(&self, body: Value) -> Result<Value> {
        Ok(self
            .gateway
            .request(ApiRequest::post(QUESTIONS).with_data(body))
            .await?)
    }

    pub async fn update(&self, id: impl Display, body: Value) -> Result<Value> {
        Ok(self
            .gateway
            .request(ApiRequest::put(detail_path(QUESTIONS, id)).with_data(body))
            .await?)
    }

    pub async fn delete(&self, id: impl Display) -> Result<()> {
        self.gateway
            .request(ApiRequest::delete(detail_path(QUESTIONS, id)))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_skips_unset_filters() {
        let query = QuestionQuery::page(2).with_subject(3).solved(false);
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({"page": 2, "subject": 3, "is_solved": false})
        );
        assert_eq!(
            serde_json::to_value(QuestionQuery::default()).unwrap(),
            json!({})
        );
    }
}
