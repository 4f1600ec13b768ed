//! HTTP implementation of [`InventoryBackend`].

use async_trait::async_trait;
use serde::Serialize;

use scanventory_catalog::{InventoryCount, NewProduct, Product};

use crate::backend::{BackendError, InventoryBackend};

/// Talks to the inventory service over HTTP.
///
/// The client is held for the lifetime of the backend so connection pooling
/// works across calls.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct CountBatch<'a> {
    counts: &'a [InventoryCount],
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::new(base_url)
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        if status.as_u16() == 404 {
            return Err(BackendError::NotFound);
        }
        Err(BackendError::Api {
            status: status.as_u16(),
            message: resp.text().await.unwrap_or_default(),
        })
    }
}

fn map_transport(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::Network(err.to_string())
    }
}

#[async_trait]
impl InventoryBackend for HttpBackend {
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        let mut req = self.client.get(self.url("/products"));
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.map_err(map_transport)?;
        let resp = Self::check_status(resp).await?;
        resp.json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }

    async fn create_product(&self, new_product: NewProduct) -> Result<Product, BackendError> {
        let mut req = self.client.post(self.url("/products")).json(&new_product);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.map_err(map_transport)?;
        let resp = Self::check_status(resp).await?;
        resp.json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }

    async fn insert_counts(&self, counts: &[InventoryCount]) -> Result<(), BackendError> {
        tracing::debug!(counts = counts.len(), "submitting inventory count batch");
        let mut req = self
            .client
            .post(self.url("/inventory-counts/batch"))
            .json(&CountBatch { counts });
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await.map_err(map_transport)?;
        Self::check_status(resp).await?;
        Ok(())
    }
}
