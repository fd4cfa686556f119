//! gRPC service implementation and the components it composes.

pub mod auth;
pub mod enrichment;
pub mod error;
pub mod product_service;
pub mod upload;

pub use auth::{AuthGate, Role};
pub use enrichment::Enricher;
pub use error::ServiceError;
pub use product_service::{CatalogOptions, ProductCatalogService};
pub use upload::{ImageUploader, UploadError};
