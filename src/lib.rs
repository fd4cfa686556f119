//! Product Service
//!
//! Product catalog gRPC service. Products and categories live in a SQL
//! record store; product reads are enriched with review and sales data
//! fetched from sibling services, degrading to zero values when those
//! services are unavailable.

pub mod config;
pub mod context;
pub mod model;
pub mod peers;
pub mod proto_ext;
pub mod services;
pub mod storage;
pub mod utils;

pub mod proto {
    tonic::include_proto!("ecommerce");
}
