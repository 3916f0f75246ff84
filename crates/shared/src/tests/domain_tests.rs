use super::*;

#[test]
fn quantity_product_serializes_with_flat_fields() {
    let product = Product {
        id: ProductId(1),
        nome: "Widget".into(),
        amount: Amount::Quantity { quantidade: 5 },
        descricao: None,
        imagem: None,
    };
    let json = serde_json::to_value(&product).expect("json");
    assert_eq!(
        json,
        serde_json::json!({ "id": 1, "nome": "Widget", "quantidade": 5 })
    );
}

#[test]
fn price_product_round_trips_optional_fields() {
    let raw = serde_json::json!({
        "id": 2,
        "nome": "Lamp",
        "preco": 19.9,
        "descricao": "desk lamp",
        "imagem": "https://img.example/lamp.png"
    });
    let product: Product = serde_json::from_value(raw).expect("product");
    assert_eq!(product.amount, Amount::Price { preco: 19.9 });
    assert_eq!(product.descricao.as_deref(), Some("desk lamp"));
    assert_eq!(product.amount.kind(), AmountKind::Price);
}

#[test]
fn integer_price_is_accepted() {
    let product: Product =
        serde_json::from_str(r#"{"id":3,"nome":"Pen","preco":2}"#).expect("product");
    assert_eq!(product.amount, Amount::Price { preco: 2.0 });
}

#[test]
fn draft_trims_name_and_drops_blank_optionals() {
    let draft = ProductDraft::new(
        "  Widget ",
        Amount::Quantity { quantidade: 0 },
        Some("   "),
        None,
    )
    .expect("draft");
    assert_eq!(draft.nome, "Widget");
    assert_eq!(draft.descricao, None);
}

#[test]
fn draft_rejects_blank_name() {
    let err = ProductDraft::new("   ", Amount::Quantity { quantidade: 1 }, None, None)
        .expect_err("blank name");
    assert_eq!(err, ValidationError::MissingName);
}

#[test]
fn draft_rejects_negative_price() {
    let err = ProductDraft::new("Lamp", Amount::Price { preco: -0.5 }, None, None)
        .expect_err("negative price");
    assert_eq!(err, ValidationError::NegativePrice);
}

#[test]
fn quantity_parsing_rules() {
    assert_eq!(parse_quantity(" 7 "), Ok(7));
    assert_eq!(parse_quantity("0"), Ok(0));
    assert_eq!(parse_quantity(""), Err(ValidationError::MissingQuantity));
    assert_eq!(parse_quantity("-1"), Err(ValidationError::NegativeQuantity));
    assert_eq!(
        parse_quantity("five"),
        Err(ValidationError::InvalidQuantity("five".into()))
    );
    assert_eq!(
        parse_quantity("2.5"),
        Err(ValidationError::InvalidQuantity("2.5".into()))
    );
}

#[test]
fn price_parsing_accepts_decimal_comma() {
    assert_eq!(parse_price("12,50"), Ok(12.5));
    assert_eq!(parse_price("-3"), Err(ValidationError::NegativePrice));
    assert_eq!(
        parse_price("inf"),
        Err(ValidationError::InvalidPrice("inf".into()))
    );
}

#[test]
fn amount_kind_parses_from_config_strings() {
    assert_eq!("price".parse::<AmountKind>(), Ok(AmountKind::Price));
    assert_eq!("Quantidade".parse::<AmountKind>(), Ok(AmountKind::Quantity));
    assert!("weight".parse::<AmountKind>().is_err());
}

#[test]
fn draft_rejects_quantity_beyond_storage_range() {
    let err = ProductDraft::new("Widget", Amount::Quantity { quantidade: u64::MAX }, None, None)
        .expect_err("too large");
    assert_eq!(err, ValidationError::InvalidQuantity(u64::MAX.to_string()));
    assert!(
        ProductDraft::new("Widget", Amount::Quantity { quantidade: i64::MAX as u64 }, None, None)
            .is_ok()
    );
}
