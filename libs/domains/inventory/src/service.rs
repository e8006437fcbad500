use std::sync::Arc;
use validator::Validate;

use crate::error::{InventoryError, InventoryResult};
use crate::models::{
    Manufacturer, Product, ProductData, ProductDto, ProductFilter, ProductInput, ProductPage,
    ProductQuery, ProductType, Resource,
};
use crate::repository::InventoryRepository;

const MAX_LOOKUP_NAME_LEN: usize = 255;

/// Service layer for inventory business rules
#[derive(Clone)]
pub struct InventoryService<R: InventoryRepository> {
    repository: Arc<R>,
}

impl<R: InventoryRepository> InventoryService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Filtered, paginated product listing ordered by id descending
    pub async fn list_products(&self, query: ProductQuery) -> InventoryResult<ProductPage> {
        if query.size == 0 {
            return Err(InventoryError::Validation(
                "size must be at least 1".to_string(),
            ));
        }
        if i64::try_from(query.size).is_err() {
            return Err(InventoryError::Validation(format!(
                "size must be at most {}",
                i64::MAX
            )));
        }
        let in_range = query
            .page
            .checked_mul(query.size)
            .is_some_and(|offset| i64::try_from(offset).is_ok());
        if !in_range {
            return Err(InventoryError::Validation(format!(
                "page {} is out of range for size {}",
                query.page, query.size
            )));
        }

        let filter = ProductFilter::from(&query);
        let (products, total) = self
            .repository
            .list_products(filter, query.page, query.size)
            .await?;

        Ok(ProductPage::new(products, query.page, query.size, total))
    }

    pub async fn get_product(&self, id: i64) -> InventoryResult<Product> {
        self.repository
            .get_product(id)
            .await?
            .ok_or(InventoryError::not_found(Resource::Product, id))
    }

    /// Same product, flattened to reference ids and names
    pub async fn get_product_dto(&self, id: i64) -> InventoryResult<ProductDto> {
        self.get_product(id).await.map(ProductDto::from)
    }

    pub async fn create_product(&self, input: ProductInput) -> InventoryResult<Product> {
        input
            .validate()
            .map_err(|e| InventoryError::Validation(e.to_string()))?;

        let data = ProductData {
            name: input.name,
            description: input.description.unwrap_or_default(),
            price: input.price,
            quantity: input.quantity.unwrap_or(0),
            manufacturer_id: input.manufacturer_id,
            type_id: input.type_id,
        };
        self.ensure_references(&data).await?;

        self.repository.create_product(data).await
    }

    /// Replace scalar fields; references change only when provided
    pub async fn update_product(&self, id: i64, input: ProductInput) -> InventoryResult<Product> {
        let existing = self.get_product(id).await?;

        input
            .validate()
            .map_err(|e| InventoryError::Validation(e.to_string()))?;

        let data = ProductData {
            name: input.name,
            description: input.description.unwrap_or_default(),
            price: input.price,
            quantity: input.quantity.unwrap_or(0),
            manufacturer_id: input
                .manufacturer_id
                .or(existing.manufacturer.map(|m| m.id)),
            type_id: input.type_id.or(existing.product_type.map(|t| t.id)),
        };
        self.ensure_references(&data).await?;

        self.repository
            .update_product(id, data)
            .await?
            .ok_or(InventoryError::not_found(Resource::Product, id))
    }

    pub async fn delete_product(&self, id: i64) -> InventoryResult<()> {
        if !self.repository.delete_product(id).await? {
            return Err(InventoryError::not_found(Resource::Product, id));
        }
        Ok(())
    }

    pub async fn count_products(&self) -> InventoryResult<u64> {
        self.repository.count_products().await
    }

    pub async fn list_manufacturers(&self) -> InventoryResult<Vec<Manufacturer>> {
        self.repository.list_manufacturers().await
    }

    pub async fn create_manufacturer(&self, name: &str) -> InventoryResult<Manufacturer> {
        let name = normalize_lookup_name(Resource::Manufacturer, name)?;
        self.repository.create_manufacturer(name).await
    }

    /// Fails while any product still references the manufacturer
    pub async fn delete_manufacturer(&self, id: i64) -> InventoryResult<()> {
        if self.repository.get_manufacturer(id).await?.is_none() {
            return Err(InventoryError::not_found(Resource::Manufacturer, id));
        }

        let referencing = self.repository.count_products_by_manufacturer(id).await?;
        if referencing > 0 {
            return Err(InventoryError::Validation(format!(
                "Manufacturer with id {id} is referenced by {referencing} product(s)"
            )));
        }

        if !self.repository.delete_manufacturer(id).await? {
            return Err(InventoryError::not_found(Resource::Manufacturer, id));
        }
        Ok(())
    }

    pub async fn list_product_types(&self) -> InventoryResult<Vec<ProductType>> {
        self.repository.list_product_types().await
    }

    pub async fn create_product_type(&self, name: &str) -> InventoryResult<ProductType> {
        let name = normalize_lookup_name(Resource::ProductType, name)?;
        self.repository.create_product_type(name).await
    }

    /// Fails while any product still references the type
    pub async fn delete_product_type(&self, id: i64) -> InventoryResult<()> {
        if self.repository.get_product_type(id).await?.is_none() {
            return Err(InventoryError::not_found(Resource::ProductType, id));
        }

        let referencing = self.repository.count_products_by_type(id).await?;
        if referencing > 0 {
            return Err(InventoryError::Validation(format!(
                "Product type with id {id} is referenced by {referencing} product(s)"
            )));
        }

        if !self.repository.delete_product_type(id).await? {
            return Err(InventoryError::not_found(Resource::ProductType, id));
        }
        Ok(())
    }

    async fn ensure_references(&self, data: &ProductData) -> InventoryResult<()> {
        if let Some(id) = data.manufacturer_id {
            if self.repository.get_manufacturer(id).await?.is_none() {
                return Err(InventoryError::Validation(format!(
                    "Manufacturer with id {id} does not exist"
                )));
            }
        }

        if let Some(id) = data.type_id {
            if self.repository.get_product_type(id).await?.is_none() {
                return Err(InventoryError::Validation(format!(
                    "Product type with id {id} does not exist"
                )));
            }
        }

        Ok(())
    }
}

fn normalize_lookup_name(resource: Resource, name: &str) -> InventoryResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(InventoryError::Validation(format!(
            "{resource} name must not be blank"
        )));
    }
    if trimmed.chars().count() > MAX_LOOKUP_NAME_LEN {
        return Err(InventoryError::Validation(format!(
            "{resource} name must be at most {MAX_LOOKUP_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MockInventoryRepository;
    use mockall::predicate::eq;
    use rust_decimal::Decimal;

    fn input(manufacturer_id: Option<i64>, type_id: Option<i64>) -> ProductInput {
        ProductInput {
            name: "Hammer".into(),
            description: None,
            price: Decimal::new(1999, 2),
            quantity: None,
            manufacturer_id,
            type_id,
        }
    }

    fn stored(id: i64, manufacturer: Option<Manufacturer>) -> Product {
        Product {
            id,
            name: "Old".into(),
            description: "old".into(),
            price: Decimal::ONE,
            quantity: 4,
            manufacturer,
            product_type: None,
        }
    }

    #[tokio::test]
    async fn test_list_rejects_zero_size() {
        let mock_repo = MockInventoryRepository::new();
        let service = InventoryService::new(mock_repo);

        let query = ProductQuery {
            size: 0,
            ..Default::default()
        };
        let err = service.list_products(query).await.unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_rejects_overflowing_offset() {
        let service = InventoryService::new(MockInventoryRepository::new());

        let query = ProductQuery {
            page: u64::MAX,
            size: 2,
            ..Default::default()
        };
        assert!(service.list_products(query).await.is_err());
    }

    #[tokio::test]
    async fn test_list_rejects_size_beyond_i64() {
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo.expect_list_products().never();
        let service = InventoryService::new(mock_repo);

        let query = ProductQuery {
            page: 0,
            size: i64::MAX as u64 + 1,
            ..Default::default()
        };
        let err = service.list_products(query).await.unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_normalizes_filter_and_builds_page() {
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo
            .expect_list_products()
            .withf(|filter, page, size| {
                filter.manufacturer.is_none()
                    && filter.product_type.as_deref() == Some("Tools")
                    && *page == 2
                    && *size == 5
            })
            .returning(|_, _, _| Ok((vec![], 11)));

        let service = InventoryService::new(mock_repo);
        let query = ProductQuery {
            page: 2,
            size: 5,
            manufacturer: Some(String::new()),
            product_type: Some("Tools".into()),
            ..Default::default()
        };
        let page = service.list_products(query).await.unwrap();

        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_items, 11);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page_size, 5);
        assert!(page.products.is_empty());
    }

    #[tokio::test]
    async fn test_create_with_missing_manufacturer_fails() {
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo
            .expect_get_manufacturer()
            .with(eq(42))
            .returning(|_| Ok(None));
        mock_repo.expect_create_product().never();

        let service = InventoryService::new(mock_repo);
        let err = service.create_product(input(Some(42), None)).await.unwrap_err();

        assert!(matches!(err, InventoryError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_applies_defaults() {
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo
            .expect_create_product()
            .withf(|data| data.description.is_empty() && data.quantity == 0)
            .returning(|data| {
                Ok(Product {
                    id: 1,
                    name: data.name,
                    description: data.description,
                    price: data.price,
                    quantity: data.quantity,
                    manufacturer: None,
                    product_type: None,
                })
            });

        let service = InventoryService::new(mock_repo);
        let product = service.create_product(input(None, None)).await.unwrap();
        assert_eq!(product.id, 1);
        assert_eq!(product.price, Decimal::new(1999, 2));
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let service = InventoryService::new(MockInventoryRepository::new());
        let mut bad = input(None, None);
        bad.price = Decimal::NEGATIVE_ONE;

        let err = service.create_product(bad).await.unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_missing_product_is_not_found() {
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo.expect_get_product().returning(|_| Ok(None));
        mock_repo.expect_update_product().never();

        let service = InventoryService::new(mock_repo);
        let err = service.update_product(5, input(None, None)).await.unwrap_err();

        assert!(matches!(err, InventoryError::NotFound { id: 5, .. }));
    }

    #[tokio::test]
    async fn test_update_keeps_omitted_references() {
        let acme = Manufacturer {
            id: 3,
            name: "Acme".into(),
        };
        let existing = stored(5, Some(acme.clone()));

        let mut mock_repo = MockInventoryRepository::new();
        mock_repo
            .expect_get_product()
            .with(eq(5))
            .returning(move |_| Ok(Some(existing.clone())));
        let lookup = acme.clone();
        mock_repo
            .expect_get_manufacturer()
            .with(eq(3))
            .returning(move |_| Ok(Some(lookup.clone())));
        mock_repo
            .expect_update_product()
            .withf(|id, data| {
                *id == 5
                    && data.manufacturer_id == Some(3)
                    && data.type_id.is_none()
                    && data.name == "Hammer"
                    && data.quantity == 0
            })
            .returning(move |id, data| {
                Ok(Some(Product {
                    id,
                    name: data.name,
                    description: data.description,
                    price: data.price,
                    quantity: data.quantity,
                    manufacturer: Some(acme.clone()),
                    product_type: None,
                }))
            });

        let service = InventoryService::new(mock_repo);
        let updated = service.update_product(5, input(None, None)).await.unwrap();

        assert_eq!(updated.name, "Hammer");
        assert_eq!(updated.manufacturer.map(|m| m.id), Some(3));
    }

    #[tokio::test]
    async fn test_delete_missing_product_is_not_found() {
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo
            .expect_delete_product()
            .with(eq(9))
            .returning(|_| Ok(false));

        let service = InventoryService::new(mock_repo);
        let err = service.delete_product(9).await.unwrap_err();
        assert!(matches!(err, InventoryError::NotFound { id: 9, .. }));
    }

    #[tokio::test]
    async fn test_create_manufacturer_trims_name() {
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo
            .expect_create_manufacturer()
            .with(eq("Acme".to_string()))
            .returning(|name| Ok(Manufacturer { id: 1, name }));

        let service = InventoryService::new(mock_repo);
        let created = service.create_manufacturer("  Acme ").await.unwrap();
        assert_eq!(created.name, "Acme");
    }

    #[tokio::test]
    async fn test_blank_lookup_name_is_rejected() {
        let service = InventoryService::new(MockInventoryRepository::new());

        assert!(service.create_manufacturer("   ").await.is_err());
        assert!(service.create_product_type("").await.is_err());
        assert!(service.create_product_type(&"x".repeat(256)).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_referenced_manufacturer_is_restricted() {
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo.expect_get_manufacturer().returning(|id| {
            Ok(Some(Manufacturer {
                id,
                name: "Acme".into(),
            }))
        });
        mock_repo
            .expect_count_products_by_manufacturer()
            .returning(|_| Ok(2));
        mock_repo.expect_delete_manufacturer().never();

        let service = InventoryService::new(mock_repo);
        let err = service.delete_manufacturer(1).await.unwrap_err();
        assert!(matches!(err, InventoryError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_product_type_is_not_found() {
        let mut mock_repo = MockInventoryRepository::new();
        mock_repo.expect_get_product_type().returning(|_| Ok(None));

        let service = InventoryService::new(mock_repo);
        let err = service.delete_product_type(4).await.unwrap_err();
        assert!(matches!(err, InventoryError::NotFound { id: 4, .. }));
    }
}
