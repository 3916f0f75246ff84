use anyhow::{anyhow, Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use shared::domain::{Amount, Product, ProductDraft, ProductId};

const PRODUCT_COLUMNS: &str = "id, nome, quantidade, preco, descricao, imagem";

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // every pooled connection to `sqlite::memory:` opens its own database
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM produtos ORDER BY id"))
            .fetch_all(&self.pool)
            .await
            .context("failed to list products")?;
        rows.iter().map(product_from_row).collect()
    }

    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM produtos WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(product_from_row).transpose()
    }

    pub async fn insert_product(&self, draft: &ProductDraft) -> Result<Product> {
        let (quantidade, preco) = amount_columns(&draft.amount)?;
        let rec = sqlx::query(
            "INSERT INTO produtos (nome, quantidade, preco, descricao, imagem)
             VALUES (?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&draft.nome)
        .bind(quantidade)
        .bind(preco)
        .bind(&draft.descricao)
        .bind(&draft.imagem)
        .fetch_one(&self.pool)
        .await
        .context("failed to insert product")?;
        Ok(Product::from_draft(
            ProductId(rec.get::<i64, _>(0)),
            draft.clone(),
        ))
    }

    /// Replaces every mutable column. Returns `None` when no row has `id`.
    pub async fn replace_product(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Option<Product>> {
        let (quantidade, preco) = amount_columns(&draft.amount)?;
        let result = sqlx::query(
            "UPDATE produtos
             SET nome = ?, quantidade = ?, preco = ?, descricao = ?, imagem = ?
             WHERE id = ?",
        )
        .bind(&draft.nome)
        .bind(quantidade)
        .bind(preco)
        .bind(&draft.descricao)
        .bind(&draft.imagem)
        .bind(id.0)
        .execute(&self.pool)
        .await
        .context("failed to update product")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(Product::from_draft(id, draft.clone())))
    }

    /// Returns whether a row was removed.
    pub async fn delete_product(&self, id: ProductId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM produtos WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .context("failed to delete product")?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to read key '{key}'"))?;
        Ok(row.map(|r| r.get::<String, _>(0)))
    }

    pub async fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO kv_store (key, value) VALUES (?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to write key '{key}'"))?;
        Ok(())
    }
}

fn amount_columns(amount: &Amount) -> Result<(Option<i64>, Option<f64>)> {
    match *amount {
        Amount::Quantity { quantidade } => {
            let quantidade = i64::try_from(quantidade)
                .map_err(|_| anyhow!("quantity {quantidade} exceeds storage range"))?;
            Ok((Some(quantidade), None))
        }
        Amount::Price { preco } => Ok((None, Some(preco))),
    }
}

fn product_from_row(row: &SqliteRow) -> Result<Product> {
    let id = ProductId(row.try_get::<i64, _>("id")?);
    let quantidade: Option<i64> = row.try_get("quantidade")?;
    let preco: Option<f64> = row.try_get("preco")?;
    let amount = match (quantidade, preco) {
        (Some(q), _) => Amount::Quantity {
            quantidade: u64::try_from(q)
                .map_err(|_| anyhow!("product {id} has negative quantity {q}"))?,
        },
        (None, Some(p)) => Amount::Price { preco: p },
        (None, None) => return Err(anyhow!("product {id} has neither quantity nor price")),
    };

    Ok(Product {
        id,
        nome: row.try_get("nome")?,
        amount,
        descricao: row.try_get("descricao")?,
        imagem: row.try_get("imagem")?,
    })
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url.contains(":memory:") || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
