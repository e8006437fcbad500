use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::Display;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

/// NUMERIC(19,4) keeps 15 integer digits
const MAX_PRICE_EXCLUSIVE: i64 = 1_000_000_000_000_000;
/// ...and 4 fractional ones
const MAX_PRICE_SCALE: u32 = 4;

/// Default page size for product listings
pub const DEFAULT_PAGE_SIZE: u64 = 10;

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price < Decimal::ZERO {
        return Err(ValidationError::new("range").with_message("price must be >= 0".into()));
    }
    if *price >= Decimal::from(MAX_PRICE_EXCLUSIVE) {
        return Err(ValidationError::new("range")
            .with_message("price exceeds the supported precision".into()));
    }
    if price.normalize().scale() > MAX_PRICE_SCALE {
        return Err(ValidationError::new("range")
            .with_message("price must have at most 4 decimal places".into()));
    }
    Ok(())
}

/// Entities exposed by the inventory API, used in error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Resource {
    Product,
    Manufacturer,
    #[strum(serialize = "Product type")]
    ProductType,
}

/// A company that makes products
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Manufacturer {
    pub id: i64,
    pub name: String,
}

/// A product category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductType {
    pub id: i64,
    pub name: String,
}

/// Product with its manufacturer and type resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Unique identifier, assigned by the store
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Unit price, serialized as a decimal string
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
    /// Units in stock
    pub quantity: i32,
    pub manufacturer: Option<Manufacturer>,
    #[serde(rename = "type")]
    pub product_type: Option<ProductType>,
}

/// Flattened product representation with reference ids
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductDto {
    pub id: i64,
    pub name: String,
    pub description: String,
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
    pub quantity: i32,
    pub manufacturer_id: Option<i64>,
    pub type_id: Option<i64>,
    pub manufacturer_name: Option<String>,
    pub type_name: Option<String>,
}

impl From<Product> for ProductDto {
    fn from(product: Product) -> Self {
        let (manufacturer_id, manufacturer_name) = product
            .manufacturer
            .map(|m| (Some(m.id), Some(m.name)))
            .unwrap_or_default();
        let (type_id, type_name) = product
            .product_type
            .map(|t| (Some(t.id), Some(t.name)))
            .unwrap_or_default();

        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            quantity: product.quantity,
            manufacturer_id,
            type_id,
            manufacturer_name,
            type_name,
        }
    }
}

/// Request body for creating or replacing a product
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct ProductInput {
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Accepts a JSON number or a decimal string
    #[schema(value_type = String, example = "19.99")]
    #[validate(custom(function = "validate_price"))]
    pub price: Decimal,
    #[validate(range(min = 0))]
    pub quantity: Option<i32>,
    pub manufacturer_id: Option<i64>,
    pub type_id: Option<i64>,
}

/// Request body for creating a manufacturer
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateManufacturer {
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub name: String,
}

/// Request body for creating a product type
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateProductType {
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub name: String,
}

/// Query string of `GET /products`
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    /// Zero-based page index
    #[serde(default)]
    pub page: u64,
    /// Page size, at least 1
    #[serde(default = "default_page_size")]
    pub size: u64,
    /// Exact manufacturer name
    pub manufacturer: Option<String>,
    /// Exact product type name
    #[serde(rename = "type")]
    pub product_type: Option<String>,
    /// Inclusive lower price bound
    #[param(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound
    #[param(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            manufacturer: None,
            product_type: None,
            min_price: None,
            max_price: None,
        }
    }
}

/// Normalized product predicates; every present field must match
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub manufacturer: Option<String>,
    pub product_type: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
}

impl ProductFilter {
    pub fn matches(&self, product: &Product) -> bool {
        let name_matches = |wanted: &Option<String>, actual: Option<&str>| match wanted {
            Some(wanted) => actual == Some(wanted.as_str()),
            None => true,
        };

        name_matches(
            &self.manufacturer,
            product.manufacturer.as_ref().map(|m| m.name.as_str()),
        ) && name_matches(
            &self.product_type,
            product.product_type.as_ref().map(|t| t.name.as_str()),
        ) && self.min_price.is_none_or(|min| product.price >= min)
            && self.max_price.is_none_or(|max| product.price <= max)
    }
}

impl From<&ProductQuery> for ProductFilter {
    fn from(query: &ProductQuery) -> Self {
        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());

        Self {
            manufacturer: non_empty(&query.manufacturer),
            product_type: non_empty(&query.product_type),
            min_price: query.min_price,
            max_price: query.max_price,
        }
    }
}

/// Fully resolved column values written by the repository
#[derive(Debug, Clone, PartialEq)]
pub struct ProductData {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub quantity: i32,
    pub manufacturer_id: Option<i64>,
    pub type_id: Option<i64>,
}

/// One page of products plus pagination metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub current_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
    pub page_size: u64,
}

impl ProductPage {
    pub fn new(products: Vec<Product>, page: u64, size: u64, total_items: u64) -> Self {
        let total_pages = if size == 0 {
            0
        } else {
            total_items.div_ceil(size)
        };

        Self {
            products,
            current_page: page,
            total_items,
            total_pages,
            page_size: size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn product(price: &str, manufacturer: Option<&str>) -> Product {
        Product {
            id: 1,
            name: "Widget".into(),
            description: String::new(),
            price: Decimal::from_str(price).unwrap(),
            quantity: 1,
            manufacturer: manufacturer.map(|name| Manufacturer {
                id: 1,
                name: name.into(),
            }),
            product_type: None,
        }
    }

    #[test]
    fn test_page_math() {
        assert_eq!(ProductPage::new(vec![], 0, 10, 0).total_pages, 0);
        assert_eq!(ProductPage::new(vec![], 0, 10, 10).total_pages, 1);
        assert_eq!(ProductPage::new(vec![], 0, 10, 11).total_pages, 2);
        assert_eq!(ProductPage::new(vec![], 3, 2, 5).total_pages, 3);
    }

    #[test]
    fn test_page_serializes_camel_case() {
        let json = serde_json::to_value(ProductPage::new(vec![], 1, 5, 12)).unwrap();
        assert_eq!(json["currentPage"], 1);
        assert_eq!(json["totalItems"], 12);
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["pageSize"], 5);
    }

    #[test]
    fn test_empty_name_filters_are_dropped() {
        let query = ProductQuery {
            manufacturer: Some(String::new()),
            product_type: Some("Tools".into()),
            ..Default::default()
        };
        let filter = ProductFilter::from(&query);
        assert_eq!(filter.manufacturer, None);
        assert_eq!(filter.product_type.as_deref(), Some("Tools"));
    }

    #[test]
    fn test_filter_matches_conjunction() {
        let filter = ProductFilter {
            manufacturer: Some("Acme".into()),
            min_price: Some(Decimal::from(10)),
            max_price: Some(Decimal::from(20)),
            ..Default::default()
        };
        assert!(filter.matches(&product("15", Some("Acme"))));
        assert!(filter.matches(&product("20", Some("Acme"))));
        assert!(!filter.matches(&product("25", Some("Acme"))));
        assert!(!filter.matches(&product("15", Some("Globex"))));
        assert!(!filter.matches(&product("15", None)));
    }

    #[test]
    fn test_inverted_price_range_matches_nothing() {
        let filter = ProductFilter {
            min_price: Some(Decimal::from(30)),
            max_price: Some(Decimal::from(10)),
            ..Default::default()
        };
        assert!(!filter.matches(&product("20", None)));
    }

    #[test]
    fn test_product_serializes_price_as_string_and_type_key() {
        let json = serde_json::to_value(product("19.99", Some("Acme"))).unwrap();
        assert_eq!(json["price"], "19.99");
        assert!(json.get("type").is_some());
        assert_eq!(json["manufacturer"]["name"], "Acme");
    }

    #[test]
    fn test_input_accepts_numeric_and_string_price() {
        let from_number: ProductInput =
            serde_json::from_str(r#"{"name":"A","price":19.5}"#).unwrap();
        let from_string: ProductInput =
            serde_json::from_str(r#"{"name":"A","price":"19.5"}"#).unwrap();
        assert_eq!(from_number.price, from_string.price);
        assert_eq!(from_number.quantity, None);
    }

    #[test]
    fn test_input_validation() {
        let mut input: ProductInput =
            serde_json::from_str(r#"{"name":"Widget","price":"1.00","quantity":3}"#).unwrap();
        assert!(input.validate().is_ok());

        input.name = "   ".into();
        assert!(input.validate().is_err());

        input.name = "Widget".into();
        input.price = Decimal::from(-1);
        assert!(input.validate().is_err());

        input.price = Decimal::from(1_000_000_000_000_000i64);
        assert!(input.validate().is_err());

        input.price = Decimal::from_str("19.99999").unwrap();
        assert!(input.validate().is_err());

        input.price = Decimal::from_str("19.999900").unwrap();
        assert!(input.validate().is_ok());

        input.price = Decimal::ZERO;
        input.quantity = Some(-1);
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_dto_flattens_references() {
        let dto = ProductDto::from(product("5", Some("Acme")));
        assert_eq!(dto.manufacturer_id, Some(1));
        assert_eq!(dto.manufacturer_name.as_deref(), Some("Acme"));
        assert_eq!(dto.type_id, None);
        assert_eq!(dto.type_name, None);
    }
}
