use core_request::{ApiRequest, RequestGateway};
use serde_json::Value;
use std::fmt::Display;

use super::detail_path;
use crate::error::Result;

const CATEGORIES: &str = "categories/categories/";

/// Question categories owned by the user.
#[derive(Clone)]
pub struct CategoriesApi {
    gateway: RequestGateway,
}

impl CategoriesApi {
    pub fn new(gateway: RequestGateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Value> {
        Ok(self.gateway.request(ApiRequest::get(CATEGORIES)).await?)
    }

    pub async fn get(&self, id: impl Display) -> Result<Value> {
        Ok(self
            .gateway
            .request(ApiRequest::get(detail_path(CATEGORIES, id)))
            .await?)
    }

    pub async fn create(&self, body: Value) -> Result<Value> {
        Ok(self
            .gateway
            .request(ApiRequest::post(CATEGORIES).with_data(body))
            .await?)
    }

    pub async fn update(&self, id: impl Display, body: Value) -> Result<Value> {
        Ok(self
            .gateway
            .request(ApiRequest::put(detail_path(CATEGORIES, id)).with_data(body))
            .await?)
    }

    pub async fn delete(&self, id: impl Display) -> Result<()> {
        self.gateway
            .request(ApiRequest::delete(detail_path(CATEGORIES, id)))
            .await?;
        Ok(())
    }
}
