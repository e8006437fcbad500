//! Integration tests for the inventory domain
//!
//! These run `PgInventoryRepository` against real PostgreSQL via testcontainers
//! so that joins, constraints and decimal storage are exercised for real.

use domain_inventory::models::ProductData;
use domain_inventory::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use test_utils::{TestDataBuilder, TestDatabase, assertions::*};

fn data(name: &str, price: &str) -> ProductData {
    ProductData {
        name: name.to_string(),
        description: String::new(),
        price: Decimal::from_str(price).unwrap(),
        quantity: 1,
        manufacturer_id: None,
        type_id: None,
    }
}

fn ids(products: &[Product]) -> Vec<i64> {
    products.iter().map(|p| p.id).collect()
}

#[tokio::test]
async fn test_create_and_get_product_round_trips_decimal() {
    let db = TestDatabase::new().await;
    let repo = PgInventoryRepository::new(db.connection());

    let created = repo
        .create_product(data("Precision bolt", "1234.5678"))
        .await
        .unwrap();
    let fetched = assert_some(
        repo.get_product(created.id).await.unwrap(),
        "product should exist",
    );

    assert_eq!(fetched.price, Decimal::from_str("1234.5678").unwrap());
    assert_eq!(fetched.name, "Precision bolt");
    assert!(fetched.manufacturer.is_none());
}

#[tokio::test]
async fn test_min_price_filter_newest_first() {
    let db = TestDatabase::new().await;
    let repo = PgInventoryRepository::new(db.connection());

    repo.create_product(data("ten", "10")).await.unwrap();
    let twenty = repo.create_product(data("twenty", "20")).await.unwrap();
    let thirty = repo.create_product(data("thirty", "30")).await.unwrap();

    let filter = ProductFilter {
        min_price: Some(Decimal::from(15)),
        ..Default::default()
    };
    let (products, total) = repo.list_products(filter, 0, 10).await.unwrap();

    assert_eq!(total, 2);
    assert_eq!(ids(&products), vec![thirty.id, twenty.id]);
}

#[tokio::test]
async fn test_name_filters_join_lookups() {
    let db = TestDatabase::new().await;
    let repo = PgInventoryRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("name_filters");

    let acme = repo
        .create_manufacturer(builder.name("manufacturer", "acme"))
        .await
        .unwrap();
    let other = repo
        .create_manufacturer(builder.name("manufacturer", "other"))
        .await
        .unwrap();
    let tools = repo
        .create_product_type(builder.name("type", "tools"))
        .await
        .unwrap();

    let mut hammer = data("hammer", "15");
    hammer.manufacturer_id = Some(acme.id);
    hammer.type_id = Some(tools.id);
    let hammer = repo.create_product(hammer).await.unwrap();

    let mut saw = data("saw", "15");
    saw.manufacturer_id = Some(other.id);
    saw.type_id = Some(tools.id);
    repo.create_product(saw).await.unwrap();

    let mut rope = data("rope", "15");
    rope.manufacturer_id = Some(acme.id);
    repo.create_product(rope).await.unwrap();

    let filter = ProductFilter {
        manufacturer: Some(acme.name.clone()),
        product_type: Some(tools.name.clone()),
        ..Default::default()
    };
    let (products, total) = repo.list_products(filter, 0, 10).await.unwrap();

    assert_eq!(total, 1);
    assert_eq!(ids(&products), vec![hammer.id]);
    assert_eq!(products[0].manufacturer.as_ref(), Some(&acme));
    assert_eq!(products[0].product_type.as_ref(), Some(&tools));
}

#[tokio::test]
async fn test_pagination_metadata_and_order() {
    let db = TestDatabase::new().await;
    let repo = PgInventoryRepository::new(db.connection());

    for i in 0..5 {
        repo.create_product(data(&format!("item-{i}"), "1"))
            .await
            .unwrap();
    }

    let (first, total) = repo
        .list_products(ProductFilter::default(), 0, 2)
        .await
        .unwrap();
    assert_eq!(total, 5);
    assert_eq!(first.len(), 2);
    assert_descending(&ids(&first), "first page ids");

    let (beyond, total) = repo
        .list_products(ProductFilter::default(), 10, 2)
        .await
        .unwrap();
    assert!(beyond.is_empty());
    assert_eq!(total, 5);
    assert_eq!(ProductPage::new(beyond, 10, 2, total).total_pages, 3);
}

#[tokio::test]
async fn test_update_replaces_columns() {
    let db = TestDatabase::new().await;
    let repo = PgInventoryRepository::new(db.connection());

    let created = repo.create_product(data("before", "1")).await.unwrap();

    let mut replacement = data("after", "2.5");
    replacement.description = "updated".into();
    replacement.quantity = 9;
    let updated = assert_some(
        repo.update_product(created.id, replacement).await.unwrap(),
        "product should be updated",
    );

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.name, "after");
    assert_eq!(updated.description, "updated");
    assert_eq!(updated.quantity, 9);
    assert_eq!(updated.price, Decimal::from_str("2.5").unwrap());

    let missing = repo.update_product(i64::MAX, data("x", "1")).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_duplicate_manufacturer_name() {
    let db = TestDatabase::new().await;
    let repo = PgInventoryRepository::new(db.connection());
    let builder = TestDataBuilder::from_test_name("duplicate_manufacturer");
    let name = builder.name("manufacturer", "dup");

    repo.create_manufacturer(name.clone()).await.unwrap();
    let err = repo.create_manufacturer(name.clone()).await.unwrap_err();

    assert!(matches!(err, InventoryError::DuplicateName { .. }));
    let names: Vec<String> = repo
        .list_manufacturers()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.name)
        .collect();
    assert_eq!(names, vec![name]);
}

#[tokio::test]
async fn test_foreign_keys_are_enforced() {
    let db = TestDatabase::new().await;
    let repo = PgInventoryRepository::new(db.connection());

    let mut dangling = data("ghost", "1");
    dangling.type_id = Some(12345);
    let err = repo.create_product(dangling).await.unwrap_err();
    assert!(matches!(err, InventoryError::Validation(_)));

    let tools = repo.create_product_type("Tools".into()).await.unwrap();
    let mut hammer = data("hammer", "1");
    hammer.type_id = Some(tools.id);
    let hammer = repo.create_product(hammer).await.unwrap();

    assert_eq!(repo.count_products_by_type(tools.id).await.unwrap(), 1);
    let err = repo.delete_product_type(tools.id).await.unwrap_err();
    assert!(matches!(err, InventoryError::Validation(_)));

    assert!(repo.delete_product(hammer.id).await.unwrap());
    assert!(repo.delete_product_type(tools.id).await.unwrap());
    assert!(!repo.delete_product_type(tools.id).await.unwrap());
}

#[tokio::test]
async fn test_service_restricts_referenced_manufacturer() {
    let db = TestDatabase::new().await;
    let service = InventoryService::new(PgInventoryRepository::new(db.connection()));

    let acme = service.create_manufacturer("Acme").await.unwrap();
    service
        .create_product(ProductInput {
            name: "Anvil".into(),
            description: None,
            price: Decimal::from(100),
            quantity: Some(1),
            manufacturer_id: Some(acme.id),
            type_id: None,
        })
        .await
        .unwrap();

    let err = service.delete_manufacturer(acme.id).await.unwrap_err();
    assert!(matches!(err, InventoryError::Validation(_)));

    let err = service.delete_product(i64::MAX).await.unwrap_err();
    assert!(matches!(err, InventoryError::NotFound { .. }));
    assert_eq!(service.count_products().await.unwrap(), 1);
}
