//! SeaORM entities for the inventory tables

pub mod manufacturer;
pub mod product;
pub mod product_type;
