//! Service behavior configuration: enrichment, paging, logging.

use serde::Deserialize;

/// Read-time enrichment settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Products enriched at once for list responses.
    pub concurrency: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self { concurrency: 8 }
    }
}

/// Paging defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    /// Page size used when a request leaves `limit` at zero.
    pub default_limit: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self { default_limit: 20 }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Service name attached to every RPC span.
    pub service_name: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            service_name: "product-service".to_string(),
            json: false,
        }
    }
}
