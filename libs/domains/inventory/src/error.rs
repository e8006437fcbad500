use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use thiserror::Error;

use crate::models::Resource;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("{resource} with id {id} not found")]
    NotFound { resource: Resource, id: i64 },

    #[error("{0}")]
    Validation(String),

    #[error("{resource} with name '{name}' already exists")]
    DuplicateName { resource: Resource, name: String },

    #[error("Persistence error: {0}")]
    Persistence(String),
}

pub type InventoryResult<T> = Result<T, InventoryError>;

impl InventoryError {
    pub fn not_found(resource: Resource, id: i64) -> Self {
        Self::NotFound { resource, id }
    }
}

impl From<InventoryError> for AppError {
    fn from(err: InventoryError) -> Self {
        let message = err.to_string();
        match err {
            InventoryError::NotFound { .. } => AppError::NotFound(message),
            InventoryError::Validation(msg) => AppError::BadRequest(msg),
            InventoryError::DuplicateName { .. } => AppError::DuplicateName(message),
            InventoryError::Persistence(_) => AppError::Persistence(message),
        }
    }
}

impl IntoResponse for InventoryError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_not_found_message() {
        let err = InventoryError::not_found(Resource::ProductType, 9);
        assert_eq!(err.to_string(), "Product type with id 9 not found");
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (InventoryError::not_found(Resource::Product, 1), StatusCode::NOT_FOUND),
            (InventoryError::Validation("bad".into()), StatusCode::BAD_REQUEST),
            (
                InventoryError::DuplicateName {
                    resource: Resource::Manufacturer,
                    name: "Acme".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (InventoryError::Persistence("down".into()), StatusCode::BAD_REQUEST),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
