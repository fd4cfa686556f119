//! Service-level error taxonomy and its mapping onto gRPC status codes.

use tonic::Status;

use crate::storage::{PageError, StorageError};

use super::upload::UploadError;

/// Result type for service operations.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors returned by the product service before conversion to `Status`.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Insufficient inventory for product {product_id}: requested {requested}")]
    InsufficientInventory { product_id: i64, requested: i32 },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Auth service unavailable: {0}")]
    AuthUnavailable(String),
}

impl From<PageError> for ServiceError {
    fn from(err: PageError) -> Self {
        ServiceError::InvalidRequest(err.to_string())
    }
}

impl From<ServiceError> for Status {
    fn from(err: ServiceError) -> Self {
        let message = err.to_string();
        match err {
            ServiceError::InvalidRequest(_) => Status::invalid_argument(message),
            ServiceError::NotFound(_) => Status::not_found(message),
            ServiceError::InsufficientInventory { .. } => Status::failed_precondition(message),
            ServiceError::Storage(StorageError::Conflict(_)) => Status::already_exists(message),
            ServiceError::Storage(_) => Status::internal(message),
            ServiceError::Upload(UploadError::InvalidInput(_) | UploadError::InvalidPayload(_)) => {
                Status::invalid_argument(message)
            }
            ServiceError::Upload(_) => Status::unavailable(message),
            ServiceError::PermissionDenied(_) => Status::permission_denied(message),
            ServiceError::AuthUnavailable(_) => Status::unavailable(message),
        }
    }
}
