//! Pass/fail authorization gate for mutating operations.

use std::sync::Arc;

use tracing::debug;

use super::error::{Result, ServiceError};
use crate::context::CallContext;
use crate::peers::{AuthPeer, Claims, PeerError};

/// Roles that may perform gated operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Supplier,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Supplier => "supplier",
            Role::Admin => "admin",
        }
    }

    /// Whether claims carrying `role` satisfy this requirement.
    /// Admins pass every check.
    fn granted_to(&self, role: &str) -> bool {
        role == Role::Admin.as_str() || role == self.as_str()
    }
}

/// Asks the auth service whether the caller holds a role.
///
/// Without an auth peer every check passes.
#[derive(Clone, Default)]
pub struct AuthGate {
    peer: Option<Arc<dyn AuthPeer>>,
}

impl AuthGate {
    pub fn new(peer: Arc<dyn AuthPeer>) -> Self {
        Self { peer: Some(peer) }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn from_peer(peer: Option<Arc<dyn AuthPeer>>) -> Self {
        Self { peer }
    }

    /// Require `role`. Returns the caller's claims when the gate is enabled.
    pub async fn require(&self, role: Role, ctx: &CallContext) -> Result<Option<Claims>> {
        let Some(peer) = &self.peer else {
            return Ok(None);
        };

        let token = ctx
            .bearer_token()
            .ok_or_else(|| ServiceError::PermissionDenied("missing bearer token".to_string()))?;

        let claims = peer.claims(token, ctx).await.map_err(|e| match e {
            PeerError::Grpc(status)
                if matches!(
                    status.code(),
                    tonic::Code::Unauthenticated
                        | tonic::Code::PermissionDenied
                        | tonic::Code::InvalidArgument
                        | tonic::Code::NotFound
                ) =>
            {
                ServiceError::PermissionDenied(status.message().to_string())
            }
            other => ServiceError::AuthUnavailable(other.to_string()),
        })?;

        if !role.granted_to(&claims.role) {
            debug!(
                user_id = claims.user_id,
                role = %claims.role,
                required = role.as_str(),
                "Role check failed"
            );
            return Err(ServiceError::PermissionDenied(format!(
                "role '{}' required",
                role.as_str()
            )));
        }

        Ok(Some(claims))
    }
}
