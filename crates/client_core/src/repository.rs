use async_trait::async_trait;
use shared::domain::{Product, ProductDraft, ProductId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("product {0} not found")]
    NotFound(ProductId),
    #[error("{0}")]
    Rejected(String),
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed product data: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// `delete` of an unknown id succeeds and leaves the other records alone.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn create(&self, draft: &ProductDraft) -> Result<Product, RepositoryError>;
    async fn read(&self, id: ProductId) -> Result<Product, RepositoryError>;
    async fn update(&self, id: ProductId, draft: &ProductDraft)
        -> Result<Product, RepositoryError>;
    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError>;
}
