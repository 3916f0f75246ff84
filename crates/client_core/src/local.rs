use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use shared::domain::{Product, ProductDraft, ProductId};
use storage::Storage;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::repository::{ProductRepository, RepositoryError};

pub const PRODUCTS_KEY: &str = "produtos";
pub const LAST_ID_KEY: &str = "produtos:last_id";

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for Storage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.kv_get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.kv_set(key, value).await
    }
}

/// New ids are one above both the largest live id and the mark in
/// [`LAST_ID_KEY`], so a deleted id is never handed out again.
pub struct LocalProductRepository<S> {
    store: S,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> LocalProductRepository<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn load(&self) -> Result<Vec<Product>, RepositoryError> {
        match self.store.get(PRODUCTS_KEY).await? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }

    async fn save(&self, products: &[Product]) -> Result<(), RepositoryError> {
        let raw = serde_json::to_string(products)?;
        self.store.set(PRODUCTS_KEY, &raw).await?;
        Ok(())
    }

    async fn last_id(&self) -> Result<i64, RepositoryError> {
        let Some(raw) = self.store.get(LAST_ID_KEY).await? else {
            return Ok(0);
        };
        raw.trim()
            .parse()
            .map_err(|_| RepositoryError::Storage(anyhow::anyhow!("corrupt id counter '{raw}'")))
    }
}

#[async_trait]
impl<S: KeyValueStore> ProductRepository for LocalProductRepository<S> {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        self.load().await
    }

    async fn create(&self, draft: &ProductDraft) -> Result<Product, RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let mut products = self.load().await?;

        let max_live = products.iter().map(|p| p.id.0).max().unwrap_or(0);
        let id = ProductId(max_live.max(self.last_id().await?) + 1);
        let product = Product::from_draft(id, draft.clone());
        products.push(product.clone());

        self.save(&products).await?;
        self.store.set(LAST_ID_KEY, &id.0.to_string()).await?;
        info!(product_id = id.0, "product stored locally");
        Ok(product)
    }

    async fn read(&self, id: ProductId) -> Result<Product, RepositoryError> {
        self.load()
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or(RepositoryError::NotFound(id))
    }

    async fn update(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let mut products = self.load().await?;

        let slot = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepositoryError::NotFound(id))?;
        *slot = Product::from_draft(id, draft.clone());
        let updated = slot.clone();

        self.save(&products).await?;
        Ok(updated)
    }

    async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let mut products = self.load().await?;

        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before {
            debug!(product_id = id.0, "delete of unknown product is a no-op");
            return Ok(());
        }

        self.save(&products).await
    }
}

#[cfg(test)]
#[path = "tests/local_tests.rs"]
mod tests;
