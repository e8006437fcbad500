//! Inventory Domain
//!
//! Products, the manufacturers and product types they reference, and the
//! filtered product query behind the warehouse API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints under /products
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, reference checks, RESTRICT deletes
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Trait + in-memory and Postgres implementations
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Products, lookups, query and page types
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_inventory::{
//!     handlers,
//!     repository::InMemoryInventoryRepository,
//!     service::InventoryService,
//! };
//!
//! let repository = InMemoryInventoryRepository::new();
//! let service = InventoryService::new(repository);
//!
//! let router: axum::Router = handlers::router(service);
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;

pub use error::{InventoryError, InventoryResult};
pub use models::{
    CreateManufacturer, CreateProductType, Manufacturer, Product, ProductDto, ProductFilter,
    ProductInput, ProductPage, ProductQuery, ProductType, Resource,
};
pub use postgres::PgInventoryRepository;
pub use repository::{InMemoryInventoryRepository, InventoryRepository};
pub use service::InventoryService;
