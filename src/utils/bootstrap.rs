//! Bootstrap utilities for the product-service binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::observability::Observability;
use crate::config::{LoggingConfig, LOG_ENV_VAR};

/// Initialize tracing with the PRODUCT_LOG environment variable.
///
/// Defaults to "info" level if PRODUCT_LOG is not set. Emits JSON lines when
/// `logging.json` is enabled. Returns the handle the RPC layer logs through.
pub fn init_tracing(config: &LoggingConfig) -> Observability {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    Observability::new(config.service_name.clone())
}

/// Value of a `--config <path>`, `-c <path>` or `--config=<path>` argument.
pub fn parse_config_path<I>(args: I) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--config" || arg == "-c" {
            return args.next();
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(path.to_string());
        }
    }
    None
}
