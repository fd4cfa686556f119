//! Sibling service endpoints.

use std::time::Duration;

use serde::Deserialize;

/// Endpoints of the services this one calls.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PeersConfig {
    /// Review service (star ratings).
    pub review: PeerEndpoint,
    /// Order service (units sold).
    pub order: PeerEndpoint,
    /// Image service (thumbnail uploads).
    pub image: PeerEndpoint,
    /// Auth service. When absent, mutating calls are not gated.
    pub auth: Option<PeerEndpoint>,
}

impl Default for PeersConfig {
    fn default() -> Self {
        Self {
            review: PeerEndpoint::new("http://review-service:8080"),
            order: PeerEndpoint::new("http://order-service:8080"),
            image: PeerEndpoint::new("http://image-service:8080"),
            auth: None,
        }
    }
}

/// A single peer's address and per-call timeout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PeerEndpoint {
    /// gRPC address (`http://host:port`).
    pub address: String,
    /// Upper bound for one call, in milliseconds. The inbound deadline
    /// shortens it further.
    pub timeout_ms: u64,
}

impl PeerEndpoint {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for PeerEndpoint {
    fn default() -> Self {
        Self {
            address: String::new(),
            timeout_ms: 2000,
        }
    }
}
