use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{InventoryError, InventoryResult};
use crate::models::{Manufacturer, Product, ProductData, ProductFilter, ProductType, Resource};

/// Repository trait for inventory persistence
///
/// Product lists are ordered by id descending, lookup lists by name.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    /// One page of products matching `filter`, plus the total match count
    async fn list_products(
        &self,
        filter: ProductFilter,
        page: u64,
        size: u64,
    ) -> InventoryResult<(Vec<Product>, u64)>;

    async fn get_product(&self, id: i64) -> InventoryResult<Option<Product>>;

    async fn create_product(&self, data: ProductData) -> InventoryResult<Product>;

    /// Replace every column of an existing product; `None` if it is gone
    async fn update_product(&self, id: i64, data: ProductData) -> InventoryResult<Option<Product>>;

    /// Returns false when nothing was deleted
    async fn delete_product(&self, id: i64) -> InventoryResult<bool>;

    async fn count_products(&self) -> InventoryResult<u64>;

    async fn list_manufacturers(&self) -> InventoryResult<Vec<Manufacturer>>;

    async fn get_manufacturer(&self, id: i64) -> InventoryResult<Option<Manufacturer>>;

    async fn create_manufacturer(&self, name: String) -> InventoryResult<Manufacturer>;

    async fn delete_manufacturer(&self, id: i64) -> InventoryResult<bool>;

    /// Number of products referencing the manufacturer
    async fn count_products_by_manufacturer(&self, id: i64) -> InventoryResult<u64>;

    async fn list_product_types(&self) -> InventoryResult<Vec<ProductType>>;

    async fn get_product_type(&self, id: i64) -> InventoryResult<Option<ProductType>>;

    async fn create_product_type(&self, name: String) -> InventoryResult<ProductType>;

    async fn delete_product_type(&self, id: i64) -> InventoryResult<bool>;

    /// Number of products referencing the product type
    async fn count_products_by_type(&self, id: i64) -> InventoryResult<u64>;
}

#[derive(Debug, Default)]
struct Tables {
    products: BTreeMap<i64, ProductData>,
    manufacturers: BTreeMap<i64, String>,
    product_types: BTreeMap<i64, String>,
    next_product_id: i64,
    next_manufacturer_id: i64,
    next_product_type_id: i64,
}

impl Tables {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn check_references(&self, data: &ProductData) -> InventoryResult<()> {
        if let Some(id) = data
            .manufacturer_id
            .filter(|id| !self.manufacturers.contains_key(id))
        {
            return Err(InventoryError::Validation(format!(
                "Manufacturer with id {id} does not exist"
            )));
        }
        if let Some(id) = data
            .type_id
            .filter(|id| !self.product_types.contains_key(id))
        {
            return Err(InventoryError::Validation(format!(
                "Product type with id {id} does not exist"
            )));
        }
        Ok(())
    }

    fn hydrate(&self, id: i64, data: &ProductData) -> Product {
        Product {
            id,
            name: data.name.clone(),
            description: data.description.clone(),
            price: data.price,
            quantity: data.quantity,
            manufacturer: data.manufacturer_id.and_then(|mid| {
                self.manufacturers.get(&mid).map(|name| Manufacturer {
                    id: mid,
                    name: name.clone(),
                })
            }),
            product_type: data.type_id.and_then(|tid| {
                self.product_types.get(&tid).map(|name| ProductType {
                    id: tid,
                    name: name.clone(),
                })
            }),
        }
    }
}

fn name_taken(names: &BTreeMap<i64, String>, name: &str) -> bool {
    names.values().any(|existing| existing == name)
}

fn sorted_by_name<T>(names: &BTreeMap<i64, String>, build: impl Fn(i64, String) -> T) -> Vec<T> {
    let mut entries: Vec<(&i64, &String)> = names.iter().collect();
    entries.sort_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(b.0)));
    entries
        .into_iter()
        .map(|(id, name)| build(*id, name.clone()))
        .collect()
}

/// In-memory implementation of InventoryRepository (for development/testing)
///
/// Mirrors the database constraints: unique lookup names, foreign keys and
/// `ON DELETE RESTRICT`.
#[derive(Debug, Default, Clone)]
pub struct InMemoryInventoryRepository {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryInventoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InventoryRepository for InMemoryInventoryRepository {
    async fn list_products(
        &self,
        filter: ProductFilter,
        page: u64,
        size: u64,
    ) -> InventoryResult<(Vec<Product>, u64)> {
        let tables = self.tables.read().await;

        let matching: Vec<Product> = tables
            .products
            .iter()
            .rev()
            .map(|(id, data)| tables.hydrate(*id, data))
            .filter(|p| filter.matches(p))
            .collect();

        let total = matching.len() as u64;
        let offset = usize::try_from(page.saturating_mul(size)).unwrap_or(usize::MAX);
        let limit = usize::try_from(size).unwrap_or(usize::MAX);
        let products: Vec<Product> = matching.into_iter().skip(offset).take(limit).collect();

        tracing::debug!(page, size, total, returned = products.len(), "Listed products");
        Ok((products, total))
    }

    async fn get_product(&self, id: i64) -> InventoryResult<Option<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.get(&id).map(|data| tables.hydrate(id, data)))
    }

    async fn create_product(&self, data: ProductData) -> InventoryResult<Product> {
        let mut tables = self.tables.write().await;
        tables.check_references(&data)?;

        let id = Tables::next_id(&mut tables.next_product_id);
        let product = tables.hydrate(id, &data);
        tables.products.insert(id, data);

        tracing::info!(product_id = id, "Created product");
        Ok(product)
    }

    async fn update_product(&self, id: i64, data: ProductData) -> InventoryResult<Option<Product>> {
        let mut tables = self.tables.write().await;
        if !tables.products.contains_key(&id) {
            return Ok(None);
        }
        tables.check_references(&data)?;

        let product = tables.hydrate(id, &data);
        tables.products.insert(id, data);

        tracing::info!(product_id = id, "Updated product");
        Ok(Some(product))
    }

    async fn delete_product(&self, id: i64) -> InventoryResult<bool> {
        let mut tables = self.tables.write().await;
        let deleted = tables.products.remove(&id).is_some();
        if deleted {
            tracing::info!(product_id = id, "Deleted product");
        }
        Ok(deleted)
    }

    async fn count_products(&self) -> InventoryResult<u64> {
        Ok(self.tables.read().await.products.len() as u64)
    }

    async fn list_manufacturers(&self) -> InventoryResult<Vec<Manufacturer>> {
        let tables = self.tables.read().await;
        Ok(sorted_by_name(&tables.manufacturers, |id, name| {
            Manufacturer { id, name }
        }))
    }

    async fn get_manufacturer(&self, id: i64) -> InventoryResult<Option<Manufacturer>> {
        let tables = self.tables.read().await;
        Ok(tables
            .manufacturers
            .get(&id)
            .map(|name| Manufacturer { id, name: name.clone() }))
    }

    async fn create_manufacturer(&self, name: String) -> InventoryResult<Manufacturer> {
        let mut tables = self.tables.write().await;
        if name_taken(&tables.manufacturers, &name) {
            return Err(InventoryError::DuplicateName {
                resource: Resource::Manufacturer,
                name,
            });
        }

        let id = Tables::next_id(&mut tables.next_manufacturer_id);
        tables.manufacturers.insert(id, name.clone());

        tracing::info!(manufacturer_id = id, "Created manufacturer");
        Ok(Manufacturer { id, name })
    }

    async fn delete_manufacturer(&self, id: i64) -> InventoryResult<bool> {
        let mut tables = self.tables.write().await;
        if tables
            .products
            .values()
            .any(|p| p.manufacturer_id == Some(id))
        {
            return Err(InventoryError::Validation(format!(
                "Manufacturer with id {id} is still referenced by products"
            )));
        }

        let deleted = tables.manufacturers.remove(&id).is_some();
        if deleted {
            tracing::info!(manufacturer_id = id, "Deleted manufacturer");
        }
        Ok(deleted)
    }

    async fn count_products_by_manufacturer(&self, id: i64) -> InventoryResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .values()
            .filter(|p| p.manufacturer_id == Some(id))
            .count() as u64)
    }

    async fn list_product_types(&self) -> InventoryResult<Vec<ProductType>> {
        let tables = self.tables.read().await;
        Ok(sorted_by_name(&tables.product_types, |id, name| {
            ProductType { id, name }
        }))
    }

    async fn get_product_type(&self, id: i64) -> InventoryResult<Option<ProductType>> {
        let tables = self.tables.read().await;
        Ok(tables
            .product_types
            .get(&id)
            .map(|name| ProductType { id, name: name.clone() }))
    }

    async fn create_product_type(&self, name: String) -> InventoryResult<ProductType> {
        let mut tables = self.tables.write().await;
        if name_taken(&tables.product_types, &name) {
            return Err(InventoryError::DuplicateName {
                resource: Resource::ProductType,
                name,
            });
        }

        let id = Tables::next_id(&mut tables.next_product_type_id);
        tables.product_types.insert(id, name.clone());

        tracing::info!(product_type_id = id, "Created product type");
        Ok(ProductType { id, name })
    }

    async fn delete_product_type(&self, id: i64) -> InventoryResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.products.values().any(|p| p.type_id == Some(id)) {
            return Err(InventoryError::Validation(format!(
                "Product type with id {id} is still referenced by products"
            )));
        }

        let deleted = tables.product_types.remove(&id).is_some();
        if deleted {
            tracing::info!(product_type_id = id, "Deleted product type");
        }
        Ok(deleted)
    }

    async fn count_products_by_type(&self, id: i64) -> InventoryResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .values()
            .filter(|p| p.type_id == Some(id))
            .count() as u64)
    }
}
