use utoipa::OpenApi;

/// Root OpenAPI document; routes live under `/api`
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Warehouse API",
        description = "Products, manufacturers and product types"
    ),
    nest(
        (path = "/api/products", api = domain_inventory::handlers::ApiDoc)
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_paths_are_nested_under_api() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/api/products"));
        assert!(paths.contains_key("/api/products/{id}"));
        assert!(paths.contains_key("/api/products/dto/{id}"));
        assert!(paths.contains_key("/api/products/filters/manufacturers"));
        assert!(paths.contains_key("/api/products/types/{id}"));
    }
}
