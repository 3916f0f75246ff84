use super::*;

fn widget(quantidade: u64) -> ProductDraft {
    ProductDraft::new("Widget", Amount::Quantity { quantidade }, None, None).expect("draft")
}

#[tokio::test]
async fn inserts_and_lists_products_in_id_order() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let first = storage.insert_product(&widget(5)).await.expect("first");
    let lamp = ProductDraft::new(
        "Lamp",
        Amount::Price { preco: 19.9 },
        Some("desk lamp"),
        Some("https://img.example/lamp.png"),
    )
    .expect("draft");
    let second = storage.insert_product(&lamp).await.expect("second");

    assert_eq!(first.id, ProductId(1));
    assert_eq!(second.id, ProductId(2));

    let products = storage.list_products().await.expect("list");
    assert_eq!(products, vec![first, second]);
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.health_check().await.expect("health check");
}

#[tokio::test]
async fn replace_keeps_id_and_reports_missing_rows() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let created = storage.insert_product(&widget(5)).await.expect("insert");

    let renamed = ProductDraft::new("Gadget", Amount::Quantity { quantidade: 9 }, None, None)
        .expect("draft");
    let updated = storage
        .replace_product(created.id, &renamed)
        .await
        .expect("replace")
        .expect("row exists");
    assert_eq!(updated.id, created.id);
    assert_eq!(
        storage.get_product(created.id).await.expect("get"),
        Some(updated)
    );

    let missing = storage
        .replace_product(ProductId(42), &renamed)
        .await
        .expect("replace missing");
    assert!(missing.is_none());
}

#[tokio::test]
async fn delete_reports_whether_row_existed() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let first = storage.insert_product(&widget(1)).await.expect("first");
    let second = storage.insert_product(&widget(2)).await.expect("second");

    assert!(storage.delete_product(first.id).await.expect("delete"));
    assert!(!storage.delete_product(first.id).await.expect("delete again"));

    let products = storage.list_products().await.expect("list");
    assert_eq!(products, vec![second]);
}

#[tokio::test]
async fn autoincrement_never_reuses_deleted_ids() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    storage.insert_product(&widget(1)).await.expect("first");
    let second = storage.insert_product(&widget(2)).await.expect("second");
    storage.delete_product(second.id).await.expect("delete");

    let third = storage.insert_product(&widget(3)).await.expect("third");
    assert_eq!(third.id, ProductId(3));
}

#[tokio::test]
async fn kv_store_overwrites_values() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    assert_eq!(storage.kv_get("produtos").await.expect("get"), None);

    storage.kv_set("produtos", "[]").await.expect("set");
    storage.kv_set("produtos", "[1]").await.expect("overwrite");
    assert_eq!(
        storage.kv_get("produtos").await.expect("get").as_deref(),
        Some("[1]")
    );
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("tempdir");
    let db_path = temp_root.path().join("nested").join("inventory.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let storage = Storage::new(&database_url).await.expect("db");
    storage.insert_product(&widget(1)).await.expect("insert");
    drop(storage);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );

    let reopened = Storage::new(&database_url).await.expect("reopen");
    assert_eq!(reopened.list_products().await.expect("list").len(), 1);
}
