//! Retry utilities: backoff builders for startup connections.
//!
//! Uses `backon` for exponential backoff with jitter. Request handling never
//! retries; a failed peer call degrades or fails the request instead.

use std::time::Duration;

use backon::ExponentialBuilder;

/// Backoff for database connection retries at startup.
///
/// - Min delay: 100ms
/// - Max delay: 5s
/// - Max attempts: 30
/// - Jitter enabled
pub fn connection_backoff() -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(100))
        .with_max_delay(Duration::from_secs(5))
        .with_max_times(30)
        .with_jitter()
}
