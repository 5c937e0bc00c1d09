//! Principal resolution at the HTTP boundary

use crate::core::access::Principal;
use crate::core::error::Result;
use async_trait::async_trait;
use axum::http::HeaderMap;
use uuid::Uuid;

/// Resolves the acting principal from request headers
///
/// Implementations back this with whatever credential scheme the deployment
/// uses. A resolver can deny a request outright by returning
/// `Error::PermissionDenied`; the failure travels through the normal error
/// mapping.
#[async_trait]
pub trait PrincipalResolver: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Principal>;
}

/// Resolver handing every request the same pre-built principal (for
/// development and tests)
pub struct StaticPrincipalResolver {
    principal: Principal,
}

impl StaticPrincipalResolver {
    pub fn new(principal: Principal) -> Self {
        Self { principal }
    }
}

impl Default for StaticPrincipalResolver {
    fn default() -> Self {
        Self::new(Principal::new(Uuid::nil(), "anonymous"))
    }
}

#[async_trait]
impl PrincipalResolver for StaticPrincipalResolver {
    async fn resolve(&self, _headers: &HeaderMap) -> Result<Principal> {
        Ok(self.principal.clone())
    }
}
