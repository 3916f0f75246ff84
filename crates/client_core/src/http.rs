use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use shared::{
    domain::{Product, ProductDraft, ProductId},
    protocol::ErrorBody,
};
use tracing::{debug, warn};
use url::Url;

use crate::repository::{ProductRepository, RepositoryError};

pub struct HttpProductRepository {
    http: Client,
    base_url: String,
}

impl HttpProductRepository {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let parsed = Url::parse(base_url.trim())
            .map_err(|e| anyhow::anyhow!("invalid products url '{base_url}': {e}"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            anyhow::bail!("products url must use http or https, got '{}'", parsed.scheme());
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn item_url(&self, id: ProductId) -> String {
        format!("{}/{}", self.base_url, id.0)
    }
}

#[async_trait]
impl ProductRepository for HttpProductRepository {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let response = self.http.get(&self.base_url).send().await?;
        let response = ensure_success(response, "failed to load products").await?;
        Ok(response.json().await?)
    }

    async fn create(&self, draft: &ProductDraft) -> Result<Product, RepositoryError> {
        let response = self.http.post(&self.base_url).json(draft).send().await?;
        let response = ensure_success(response, "failed to add product").await?;
        Ok(response.json().await?)
    }

    async fn read(&self, id: ProductId) -> Result<Product, RepositoryError> {
        let response = self.http.get(self.item_url(id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(RepositoryError::NotFound(id));
        }
        let response = ensure_success(response, "failed to load product").await?;
        Ok(response.json().await?)
    }

    async fn update(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, RepositoryError> {
        let response = self.http.put(self.item_url(id)).json(draft).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(RepositoryError::NotFound(id));
        }
        let response = ensure_success(response, "failed to update product").await?;
        let body = response.bytes().await?;
        match serde_json::from_slice::<Product>(&body) {
            Ok(product) => Ok(product),
            Err(error) => {
                // older servers answer PUT with `{"mensagem": ...}`
                debug!(product_id = id.0, %error, "update reply is not a product, re-reading");
                self.read(id).await
            }
        }
    }

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let response = self.http.delete(self.item_url(id)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(product_id = id.0, "delete of unknown product treated as done");
            return Ok(());
        }
        ensure_success(response, "failed to delete product").await?;
        Ok(())
    }
}

async fn ensure_success(response: Response, fallback: &str) -> Result<Response, RepositoryError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.error)
        .ok()
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string());
    warn!(%status, %message, "products endpoint rejected request");
    Err(RepositoryError::Rejected(message))
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
