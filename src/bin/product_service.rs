//! product-service: Product catalog gRPC server
//!
//! Serves product and category records from a SQL store. Product reads are
//! enriched with review and sales data from sibling services.
//!
//! ## Architecture
//! ```text
//! [client] --(ProductService gRPC)--> [product-service] --> [SQLite | PostgreSQL]
//!                                            |
//!                                            +--> review / order / image / auth services
//! ```
//!
//! ## Configuration
//! - `config.yaml`, `--config <path>` or PRODUCT_CONFIG: YAML configuration
//! - PRODUCT__SECTION__KEY: environment overrides (e.g. PRODUCT__SERVER__PORT)
//! - PRODUCT_LOG: tracing filter (default: info)

use std::net::SocketAddr;
use std::sync::Arc;

use tonic::transport::Server;
use tonic_health::server::health_reporter;
use tracing::info;

use product_service::config::Config;
use product_service::peers::connect_peers;
use product_service::proto::product_service_server::ProductServiceServer;
use product_service::services::{CatalogOptions, ProductCatalogService};
use product_service::storage::init_storage;
use product_service::utils::bootstrap::{init_tracing, parse_config_path};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = parse_config_path(std::env::args());
    let config = Config::load(config_path.as_deref())?;

    let observability = Arc::new(init_tracing(&config.logging));

    let stores = init_storage(&config.storage).await?;
    let peers = connect_peers(&config.peers)?;

    let service = ProductCatalogService::new(
        stores,
        peers,
        observability,
        CatalogOptions::from_config(&config),
    );

    let addr: SocketAddr = config.server.listen_address().parse()?;

    // Health reporter
    let (mut health_reporter, health_service) = health_reporter();
    health_reporter
        .set_serving::<ProductServiceServer<ProductCatalogService>>()
        .await;

    info!(address = %addr, storage = ?config.storage.storage_type, "product-service started");

    Server::builder()
        .add_service(health_service)
        .add_service(ProductServiceServer::new(service))
        .serve_with_shutdown(addr, async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
