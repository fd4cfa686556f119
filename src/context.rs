//! Per-call context carried from an inbound RPC into store and peer calls.
//!
//! Holds the inbound deadline (from the `grpc-timeout` header) and the
//! caller's authorization metadata. Outgoing peer requests inherit the
//! remaining deadline, capped by the peer's configured timeout.

use std::time::Duration;

use tokio::time::Instant;
use tonic::metadata::MetadataMap;

/// gRPC header carrying the caller's deadline.
pub const GRPC_TIMEOUT_HEADER: &str = "grpc-timeout";
/// Metadata key carrying the caller's credentials.
pub const AUTHORIZATION_HEADER: &str = "authorization";
/// Authorization scheme prefix, matched case-insensitively.
const BEARER_SCHEME: &str = "Bearer";

/// Request-scoped context.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    authorization: Option<String>,
}

impl CallContext {
    /// Context with no deadline and no credentials.
    pub fn background() -> Self {
        Self::default()
    }

    /// Build a context from inbound request metadata.
    pub fn from_metadata(metadata: &MetadataMap) -> Self {
        let deadline = metadata
            .get(GRPC_TIMEOUT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_grpc_timeout)
            .map(|timeout| Instant::now() + timeout);

        let authorization = metadata
            .get(AUTHORIZATION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Self {
            deadline,
            authorization,
        }
    }

    /// Build a context from an inbound request.
    pub fn from_request<T>(request: &tonic::Request<T>) -> Self {
        Self::from_metadata(request.metadata())
    }

    /// Set a deadline relative to now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Set the raw authorization value (e.g. `Bearer <token>`).
    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }

    /// Time left before the inbound deadline, if one was set.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Bearer token from the authorization metadata.
    pub fn bearer_token(&self) -> Option<&str> {
        let value = self.authorization.as_deref()?.trim();
        let token = match value.get(..BEARER_SCHEME.len()) {
            Some(scheme) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => {
                let rest = &value[BEARER_SCHEME.len()..];
                // "Bearerabc" is a raw token, not the scheme.
                if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
                    value
                } else {
                    rest.trim()
                }
            }
            _ => value,
        };
        (!token.is_empty()).then_some(token)
    }

    /// Budget for an outgoing call: the remaining deadline capped by `cap`.
    pub fn budget(&self, cap: Duration) -> Duration {
        match self.remaining() {
            Some(remaining) => remaining.min(cap),
            None => cap,
        }
    }

    /// Wrap a message for an outgoing peer call with the inherited timeout.
    pub fn peer_request<T>(&self, message: T, cap: Duration) -> tonic::Request<T> {
        let mut request = tonic::Request::new(message);
        request.set_timeout(self.budget(cap));
        request
    }
}

/// Parse a `grpc-timeout` header value (`<1-8 digits><H|M|S|m|u|n>`).
pub fn parse_grpc_timeout(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value.len() < 2 || value.len() > 9 {
        return None;
    }
    let (digits, unit) = value.split_at(value.len() - 1);
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let amount: u64 = digits.parse().ok()?;

    let duration = match unit {
        "H" => Duration::from_secs(amount.checked_mul(3600)?),
        "M" => Duration::from_secs(amount.checked_mul(60)?),
        "S" => Duration::from_secs(amount),
        "m" => Duration::from_millis(amount),
        "u" => Duration::from_micros(amount),
        "n" => Duration::from_nanos(amount),
        _ => return None,
    };
    Some(duration)
}
