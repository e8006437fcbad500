use axum::Router;
use domain_inventory::{InventoryService, PgInventoryRepository, handlers};

pub fn router(state: &crate::state::AppState) -> Router {
    let repository = PgInventoryRepository::new(state.db.clone());
    let service = InventoryService::new(repository);
    handlers::router(service)
}
