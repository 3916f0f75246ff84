use shared::{
    domain::{Product, ProductId},
    error::ApiError,
    protocol::ProductPayload,
};
use storage::Storage;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
}

pub fn products_route() -> &'static str {
    "/produtos"
}

pub fn product_route() -> &'static str {
    "/produtos/:id"
}

pub async fn list_products(ctx: &ApiContext) -> Result<Vec<Product>, ApiError> {
    ctx.storage.list_products().await.map_err(internal)
}

pub async fn get_product(ctx: &ApiContext, id: ProductId) -> Result<Product, ApiError> {
    ctx.storage
        .get_product(id)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(id))
}

pub async fn create_product(ctx: &ApiContext, payload: ProductPayload) -> Result<Product, ApiError> {
    let draft = payload.into_draft().map_err(|e| {
        warn!(error = %e, "rejected product create");
        ApiError::from(e)
    })?;
    let product = ctx.storage.insert_product(&draft).await.map_err(internal)?;
    info!(product_id = product.id.0, nome = %product.nome, "product created");
    Ok(product)
}

pub async fn update_product(
    ctx: &ApiContext,
    id: ProductId,
    payload: ProductPayload,
) -> Result<Product, ApiError> {
    let draft = payload.into_draft().map_err(|e| {
        warn!(product_id = id.0, error = %e, "rejected product update");
        ApiError::from(e)
    })?;
    let product = ctx
        .storage
        .replace_product(id, &draft)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(id))?;
    info!(product_id = id.0, "product updated");
    Ok(product)
}

pub async fn delete_product(ctx: &ApiContext, id: ProductId) -> Result<(), ApiError> {
    if !ctx.storage.delete_product(id).await.map_err(internal)? {
        return Err(not_found(id));
    }
    info!(product_id = id.0, "product deleted");
    Ok(())
}

fn not_found(id: ProductId) -> ApiError {
    ApiError::not_found(format!("product with id {id} not found"))
}

fn internal(err: anyhow::Error) -> ApiError {
    error!(error = %err, "storage failure");
    ApiError::internal(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::{domain::Amount, error::ErrorCode};

    async fn setup() -> ApiContext {
        let storage = Storage::new("sqlite::memory:").await.expect("db");
        ApiContext { storage }
    }

    fn payload(value: serde_json::Value) -> ProductPayload {
        serde_json::from_value(value).expect("payload")
    }

    #[tokio::test]
    async fn create_then_list_contains_new_product() {
        let ctx = setup().await;
        let created = create_product(&ctx, payload(json!({ "nome": "Widget", "quantidade": 5 })))
            .await
            .expect("create");
        assert_eq!(created.id, ProductId(1));

        let products = list_products(&ctx).await.expect("list");
        assert_eq!(products, vec![created]);
    }

    #[tokio::test]
    async fn create_rejects_blank_name_without_touching_storage() {
        let ctx = setup().await;
        let err = create_product(&ctx, payload(json!({ "nome": "  ", "quantidade": 5 })))
            .await
            .expect_err("blank name");
        assert!(matches!(err.code, ErrorCode::Validation));
        assert!(list_products(&ctx).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn update_replaces_fields_and_keeps_id() {
        let ctx = setup().await;
        let created = create_product(&ctx, payload(json!({ "nome": "Widget", "quantidade": 5 })))
            .await
            .expect("create");

        let updated = update_product(
            &ctx,
            created.id,
            payload(json!({ "nome": "Widget XL", "quantidade": "8" })),
        )
        .await
        .expect("update");
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.amount, Amount::Quantity { quantidade: 8 });
        assert_eq!(get_product(&ctx, created.id).await.expect("get"), updated);
    }

    #[tokio::test]
    async fn missing_ids_report_not_found() {
        let ctx = setup().await;
        let err = get_product(&ctx, ProductId(9)).await.expect_err("missing");
        assert!(matches!(err.code, ErrorCode::NotFound));

        let err = update_product(
            &ctx,
            ProductId(9),
            payload(json!({ "nome": "Ghost", "quantidade": 1 })),
        )
        .await
        .expect_err("missing");
        assert!(matches!(err.code, ErrorCode::NotFound));

        let err = delete_product(&ctx, ProductId(9)).await.expect_err("missing");
        assert!(matches!(err.code, ErrorCode::NotFound));
    }

    #[tokio::test]
    async fn delete_removes_only_the_target() {
        let ctx = setup().await;
        let first = create_product(&ctx, payload(json!({ "nome": "A", "quantidade": 1 })))
            .await
            .expect("first");
        let second = create_product(&ctx, payload(json!({ "nome": "B", "quantidade": 2 })))
            .await
            .expect("second");

        delete_product(&ctx, first.id).await.expect("delete");
        assert_eq!(list_products(&ctx).await.expect("list"), vec![second]);
    }
}
