//! Server and networking configuration types.

use serde::Deserialize;

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Port for the product gRPC service.
    pub port: u16,
    /// Host to bind to.
    pub host: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl ServerConfig {
    /// `host:port` listen address.
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
