use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{delete, get, post},
};
use axum_helpers::{
    ErrorResponse, IdPath, QueryParams, ValidatedJson,
    errors::responses::{BadRequestIdResponse, BadRequestValidationResponse, NotFoundResponse},
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::InventoryResult;
use crate::models::{
    CreateManufacturer, CreateProductType, Manufacturer, Product, ProductDto, ProductInput,
    ProductPage, ProductQuery, ProductType,
};
use crate::repository::InventoryRepository;
use crate::service::InventoryService;

/// OpenAPI tag shared by every inventory endpoint
pub const TAG: &str = "products";

type SharedService<R> = Arc<InventoryService<R>>;

/// OpenAPI documentation for the inventory API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        count_products,
        get_product,
        get_product_dto,
        update_product,
        delete_product,
        list_manufacturers,
        list_product_types,
        create_manufacturer,
        delete_manufacturer,
        create_product_type,
        delete_product_type,
    ),
    components(
        schemas(
            Product,
            ProductDto,
            ProductInput,
            ProductPage,
            Manufacturer,
            ProductType,
            CreateManufacturer,
            CreateProductType,
            ErrorResponse
        ),
        responses(NotFoundResponse, BadRequestValidationResponse, BadRequestIdResponse)
    ),
    tags(
        (name = TAG, description = "Products, manufacturers and product types")
    )
)]
pub struct ApiDoc;

/// Create the inventory router with all HTTP endpoints
pub fn router<R: InventoryRepository + 'static>(service: InventoryService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/count", get(count_products))
        .route(
            "/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/dto/{id}", get(get_product_dto))
        .route("/filters/manufacturers", get(list_manufacturers))
        .route("/filters/types", get(list_product_types))
        .route("/manufacturers", post(create_manufacturer))
        .route("/manufacturers/{id}", delete(delete_manufacturer))
        .route("/types", post(create_product_type))
        .route("/types/{id}", delete(delete_product_type))
        .with_state(shared_service)
}

/// List products, filtered and paginated, newest first
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    params(ProductQuery),
    responses(
        (status = 200, description = "One page of products", body = ProductPage),
        (status = 400, description = "Malformed query or size of 0", body = ErrorResponse)
    )
)]
async fn list_products<R: InventoryRepository>(
    State(service): State<SharedService<R>>,
    QueryParams(query): QueryParams<ProductQuery>,
) -> InventoryResult<Json<ProductPage>> {
    let page = service.list_products(query).await?;
    Ok(Json(page))
}

/// Create a product
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = ProductInput,
    responses(
        (status = 200, description = "Product created", body = Product),
        (status = 400, response = BadRequestValidationResponse)
    )
)]
async fn create_product<R: InventoryRepository>(
    State(service): State<SharedService<R>>,
    ValidatedJson(input): ValidatedJson<ProductInput>,
) -> InventoryResult<Json<Product>> {
    let product = service.create_product(input).await?;
    Ok(Json(product))
}

/// Total number of products
#[utoipa::path(
    get,
    path = "/count",
    tag = TAG,
    responses(
        (status = 200, description = "Product count", body = u64)
    )
)]
async fn count_products<R: InventoryRepository>(
    State(service): State<SharedService<R>>,
) -> InventoryResult<Json<u64>> {
    let count = service.count_products().await?;
    Ok(Json(count))
}

/// Get a product by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product found", body = Product),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_product<R: InventoryRepository>(
    State(service): State<SharedService<R>>,
    IdPath(id): IdPath,
) -> InventoryResult<Json<Product>> {
    let product = service.get_product(id).await?;
    Ok(Json(product))
}

/// Get a product by id with flattened references
#[utoipa::path(
    get,
    path = "/dto/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product found", body = ProductDto),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn get_product_dto<R: InventoryRepository>(
    State(service): State<SharedService<R>>,
    IdPath(id): IdPath,
) -> InventoryResult<Json<ProductDto>> {
    let dto = service.get_product_dto(id).await?;
    Ok(Json(dto))
}

/// Replace a product; omitted references are kept
#[utoipa::path(
    put,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product id")
    ),
    request_body = ProductInput,
    responses(
        (status = 200, description = "Product updated", body = Product),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn update_product<R: InventoryRepository>(
    State(service): State<SharedService<R>>,
    IdPath(id): IdPath,
    ValidatedJson(input): ValidatedJson<ProductInput>,
) -> InventoryResult<Json<Product>> {
    let product = service.update_product(id, input).await?;
    Ok(Json(product))
}

/// Delete a product
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product id")
    ),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_product<R: InventoryRepository>(
    State(service): State<SharedService<R>>,
    IdPath(id): IdPath,
) -> InventoryResult<StatusCode> {
    service.delete_product(id).await?;
    Ok(StatusCode::OK)
}

/// All manufacturers, ordered by name
#[utoipa::path(
    get,
    path = "/filters/manufacturers",
    tag = TAG,
    responses(
        (status = 200, description = "Manufacturers", body = Vec<Manufacturer>)
    )
)]
async fn list_manufacturers<R: InventoryRepository>(
    State(service): State<SharedService<R>>,
) -> InventoryResult<Json<Vec<Manufacturer>>> {
    let manufacturers = service.list_manufacturers().await?;
    Ok(Json(manufacturers))
}

/// All product types, ordered by name
#[utoipa::path(
    get,
    path = "/filters/types",
    tag = TAG,
    responses(
        (status = 200, description = "Product types", body = Vec<ProductType>)
    )
)]
async fn list_product_types<R: InventoryRepository>(
    State(service): State<SharedService<R>>,
) -> InventoryResult<Json<Vec<ProductType>>> {
    let types = service.list_product_types().await?;
    Ok(Json(types))
}

/// Create a manufacturer
#[utoipa::path(
    post,
    path = "/manufacturers",
    tag = TAG,
    request_body = CreateManufacturer,
    responses(
        (status = 200, description = "Manufacturer created", body = Manufacturer),
        (status = 400, response = BadRequestValidationResponse)
    )
)]
async fn create_manufacturer<R: InventoryRepository>(
    State(service): State<SharedService<R>>,
    ValidatedJson(input): ValidatedJson<CreateManufacturer>,
) -> InventoryResult<Json<Manufacturer>> {
    let manufacturer = service.create_manufacturer(&input.name).await?;
    Ok(Json(manufacturer))
}

/// Delete an unreferenced manufacturer
#[utoipa::path(
    delete,
    path = "/manufacturers/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Manufacturer id")
    ),
    responses(
        (status = 200, description = "Manufacturer deleted"),
        (status = 400, description = "Invalid id or still referenced", body = ErrorResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_manufacturer<R: InventoryRepository>(
    State(service): State<SharedService<R>>,
    IdPath(id): IdPath,
) -> InventoryResult<StatusCode> {
    service.delete_manufacturer(id).await?;
    Ok(StatusCode::OK)
}

/// Create a product type
#[utoipa::path(
    post,
    path = "/types",
    tag = TAG,
    request_body = CreateProductType,
    responses(
        (status = 200, description = "Product type created", body = ProductType),
        (status = 400, response = BadRequestValidationResponse)
    )
)]
async fn create_product_type<R: InventoryRepository>(
    State(service): State<SharedService<R>>,
    ValidatedJson(input): ValidatedJson<CreateProductType>,
) -> InventoryResult<Json<ProductType>> {
    let product_type = service.create_product_type(&input.name).await?;
    Ok(Json(product_type))
}

/// Delete an unreferenced product type
#[utoipa::path(
    delete,
    path = "/types/{id}",
    tag = TAG,
    params(
        ("id" = i64, Path, description = "Product type id")
    ),
    responses(
        (status = 200, description = "Product type deleted"),
        (status = 400, description = "Invalid id or still referenced", body = ErrorResponse),
        (status = 404, response = NotFoundResponse)
    )
)]
async fn delete_product_type<R: InventoryRepository>(
    State(service): State<SharedService<R>>,
    IdPath(id): IdPath,
) -> InventoryResult<StatusCode> {
    service.delete_product_type(id).await?;
    Ok(StatusCode::OK)
}
