use core_request::{ApiRequest, RequestGateway};
use serde_json::{json, Value};
use std::fmt::Display;

use crate::error::Result;

const ANSWERS: &str = "answers/answers/";

/// Answers attached to questions.
#[derive(Clone)]
pub struct AnswersApi {
    gateway: RequestGateway,
}

impl AnswersApi {
    pub fn new(gateway: RequestGateway) -> Self {
        Self { gateway }
    }

    /// Answers recorded for one question, filtered server side.
    pub async fn list_for_question(&self, question_id: impl Display) -> Result<Value> {
        let request = ApiRequest::get(ANSWERS)
            .with_data(json!({ "question_id": question_id.to_string() }));
        Ok(self.gateway.request(request).await?)
    }

    pub async fn create(&self, body: Value) -> Result<Value> {
        Ok(self
            .gateway
            .request(ApiRequest::post(ANSWERS).with_data(body))
            .await?)
    }
}
