use async_trait::async_trait;
use database::BaseRepository;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, SqlErr,
};
use std::collections::{BTreeSet, HashMap};

use crate::{
    entity::{manufacturer, product, product_type},
    error::{InventoryError, InventoryResult},
    models::{Manufacturer, Product, ProductData, ProductFilter, ProductType, Resource},
    repository::InventoryRepository,
};

/// Map a store error, turning constraint violations into domain errors
fn map_db_err(resource: Resource, name: Option<&str>, err: DbErr) -> InventoryError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => InventoryError::DuplicateName {
            resource,
            name: name.unwrap_or_default().to_string(),
        },
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            InventoryError::Validation(format!("{resource} violates a reference: {detail}"))
        }
        _ => InventoryError::Persistence(err.to_string()),
    }
}

fn persistence(err: DbErr) -> InventoryError {
    InventoryError::Persistence(err.to_string())
}

pub struct PgInventoryRepository {
    products: BaseRepository<product::Entity>,
    manufacturers: BaseRepository<manufacturer::Entity>,
    product_types: BaseRepository<product_type::Entity>,
}

impl PgInventoryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            products: BaseRepository::new(db.clone()),
            manufacturers: BaseRepository::new(db.clone()),
            product_types: BaseRepository::new(db),
        }
    }

    fn db(&self) -> &DatabaseConnection {
        self.products.db()
    }

    /// Resolve manufacturer and type references in two batched lookups
    async fn hydrate(&self, models: Vec<product::Model>) -> InventoryResult<Vec<Product>> {
        let manufacturer_ids: BTreeSet<i64> =
            models.iter().filter_map(|m| m.manufacturer_id).collect();
        let type_ids: BTreeSet<i64> = models.iter().filter_map(|m| m.type_id).collect();

        let manufacturers: HashMap<i64, Manufacturer> = if manufacturer_ids.is_empty() {
            HashMap::new()
        } else {
            manufacturer::Entity::find()
                .filter(manufacturer::Column::Id.is_in(manufacturer_ids))
                .all(self.db())
                .await
                .map_err(persistence)?
                .into_iter()
                .map(|m| (m.id, m.into()))
                .collect()
        };

        let product_types: HashMap<i64, ProductType> = if type_ids.is_empty() {
            HashMap::new()
        } else {
            product_type::Entity::find()
                .filter(product_type::Column::Id.is_in(type_ids))
                .all(self.db())
                .await
                .map_err(persistence)?
                .into_iter()
                .map(|t| (t.id, t.into()))
                .collect()
        };

        Ok(models
            .into_iter()
            .map(|m| Product {
                manufacturer: m
                    .manufacturer_id
                    .and_then(|id| manufacturers.get(&id).cloned()),
                product_type: m.type_id.and_then(|id| product_types.get(&id).cloned()),
                id: m.id,
                name: m.name,
                description: m.description,
                price: m.price,
                quantity: m.quantity,
            })
            .collect())
    }

    async fn hydrate_one(&self, model: product::Model) -> InventoryResult<Product> {
        let mut products = self.hydrate(vec![model]).await?;
        products
            .pop()
            .ok_or_else(|| InventoryError::Persistence("product vanished while loading".into()))
    }
}

#[async_trait]
impl InventoryRepository for PgInventoryRepository {
    async fn list_products(
        &self,
        filter: ProductFilter,
        page: u64,
        size: u64,
    ) -> InventoryResult<(Vec<Product>, u64)> {
        let mut query = product::Entity::find();

        if let Some(name) = filter.manufacturer {
            query = query
                .join(JoinType::InnerJoin, product::Relation::Manufacturer.def())
                .filter(manufacturer::Column::Name.eq(name));
        }
        if let Some(name) = filter.product_type {
            query = query
                .join(JoinType::InnerJoin, product::Relation::ProductType.def())
                .filter(product_type::Column::Name.eq(name));
        }
        if let Some(min) = filter.min_price {
            query = query.filter(product::Column::Price.gte(min));
        }
        if let Some(max) = filter.max_price {
            query = query.filter(product::Column::Price.lte(max));
        }

        let total = query
            .clone()
            .count(self.db())
            .await
            .map_err(persistence)?;

        let models = query
            .order_by_desc(product::Column::Id)
            .limit(size)
            .offset(page.saturating_mul(size))
            .all(self.db())
            .await
            .map_err(persistence)?;

        let products = self.hydrate(models).await?;
        tracing::debug!(page, size, total, returned = products.len(), "Listed products");
        Ok((products, total))
    }

    async fn get_product(&self, id: i64) -> InventoryResult<Option<Product>> {
        let model = self.products.find_by_id(id).await.map_err(persistence)?;

        match model {
            Some(model) => Ok(Some(self.hydrate_one(model).await?)),
            None => Ok(None),
        }
    }

    async fn create_product(&self, data: ProductData) -> InventoryResult<Product> {
        let active_model = product::ActiveModel::from_data(None, data);

        let model = self
            .products
            .insert(active_model)
            .await
            .map_err(|e| map_db_err(Resource::Product, None, e))?;

        tracing::info!(product_id = model.id, "Created product");
        self.hydrate_one(model).await
    }

    async fn update_product(&self, id: i64, data: ProductData) -> InventoryResult<Option<Product>> {
        let active_model = product::ActiveModel::from_data(Some(id), data);

        let model = match self.products.update(active_model).await {
            Ok(model) => model,
            Err(DbErr::RecordNotUpdated) => return Ok(None),
            Err(e) => return Err(map_db_err(Resource::Product, None, e)),
        };

        tracing::info!(product_id = id, "Updated product");
        Ok(Some(self.hydrate_one(model).await?))
    }

    async fn delete_product(&self, id: i64) -> InventoryResult<bool> {
        let rows = self
            .products
            .delete_by_id(id)
            .await
            .map_err(persistence)?;

        if rows > 0 {
            tracing::info!(product_id = id, "Deleted product");
        }
        Ok(rows > 0)
    }

    async fn count_products(&self) -> InventoryResult<u64> {
        self.products.count().await.map_err(persistence)
    }

    async fn list_manufacturers(&self) -> InventoryResult<Vec<Manufacturer>> {
        let models = manufacturer::Entity::find()
            .order_by_asc(manufacturer::Column::Name)
            .order_by_asc(manufacturer::Column::Id)
            .all(self.db())
            .await
            .map_err(persistence)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn get_manufacturer(&self, id: i64) -> InventoryResult<Option<Manufacturer>> {
        let model = self
            .manufacturers
            .find_by_id(id)
            .await
            .map_err(persistence)?;
        Ok(model.map(Into::into))
    }

    async fn create_manufacturer(&self, name: String) -> InventoryResult<Manufacturer> {
        let active_model = manufacturer::ActiveModel {
            id: NotSet,
            name: Set(name.clone()),
        };

        let model = self
            .manufacturers
            .insert(active_model)
            .await
            .map_err(|e| map_db_err(Resource::Manufacturer, Some(&name), e))?;

        tracing::info!(manufacturer_id = model.id, "Created manufacturer");
        Ok(model.into())
    }

    async fn delete_manufacturer(&self, id: i64) -> InventoryResult<bool> {
        let rows = self
            .manufacturers
            .delete_by_id(id)
            .await
            .map_err(|e| map_db_err(Resource::Manufacturer, None, e))?;

        if rows > 0 {
            tracing::info!(manufacturer_id = id, "Deleted manufacturer");
        }
        Ok(rows > 0)
    }

    async fn count_products_by_manufacturer(&self, id: i64) -> InventoryResult<u64> {
        product::Entity::find()
            .filter(product::Column::ManufacturerId.eq(id))
            .count(self.db())
            .await
            .map_err(persistence)
    }

    async fn list_product_types(&self) -> InventoryResult<Vec<ProductType>> {
        let models = product_type::Entity::find()
            .order_by_asc(product_type::Column::Name)
            .order_by_asc(product_type::Column::Id)
            .all(self.db())
            .await
            .map_err(persistence)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn get_product_type(&self, id: i64) -> InventoryResult<Option<ProductType>> {
        let model = self
            .product_types
            .find_by_id(id)
            .await
            .map_err(persistence)?;
        Ok(model.map(Into::into))
    }

    async fn create_product_type(&self, name: String) -> InventoryResult<ProductType> {
        let active_model = product_type::ActiveModel {
            id: NotSet,
            name: Set(name.clone()),
        };

        let model = self
            .product_types
            .insert(active_model)
            .await
            .map_err(|e| map_db_err(Resource::ProductType, Some(&name), e))?;

        tracing::info!(product_type_id = model.id, "Created product type");
        Ok(model.into())
    }

    async fn delete_product_type(&self, id: i64) -> InventoryResult<bool> {
        let rows = self
            .product_types
            .delete_by_id(id)
            .await
            .map_err(|e| map_db_err(Resource::ProductType, None, e))?;

        if rows > 0 {
            tracing::info!(product_type_id = id, "Deleted product type");
        }
        Ok(rows > 0)
    }

    async fn count_products_by_type(&self, id: i64) -> InventoryResult<u64> {
        product::Entity::find()
            .filter(product::Column::TypeId.eq(id))
            .count(self.db())
            .await
            .map_err(persistence)
    }
}
