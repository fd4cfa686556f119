//! Observability handle passed into the RPC layer.

use tracing::{info_span, Span};

/// Process-wide logging identity, created once by the bootstrap.
#[derive(Debug, Clone)]
pub struct Observability {
    service_name: String,
}

impl Observability {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Span wrapping one inbound RPC.
    pub fn rpc_span(&self, method: &'static str) -> Span {
        info_span!("rpc", service = %self.service_name, method)
    }
}

impl Default for Observability {
    fn default() -> Self {
        Self::new(env!("CARGO_PKG_NAME"))
    }
}
