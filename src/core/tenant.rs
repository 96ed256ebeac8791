//! Tenant context extraction and role policies.
//!
//! Every API request names its tenant through the `X-Tenant-ID` header;
//! the optional `X-User-ID` and `X-Roles` headers identify the acting user.
//! Authentication proper happens upstream of this service — here tenancy
//! is part of the request shape, and all storage access is keyed by it.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::core::error::{PlatformError, PlatformResult, ValidationError};

pub const TENANT_HEADER: &str = "x-tenant-id";
pub const USER_HEADER: &str = "x-user-id";
pub const ROLES_HEADER: &str = "x-roles";

/// The tenant and actor a request runs under.
#[derive(Debug, Clone)]
pub struct TenantContext {
    pub tenant_id: Uuid,
    pub user_id: Option<Uuid>,
    pub roles: Vec<String>,
}

impl TenantContext {
    pub fn new(tenant_id: Uuid) -> Self {
        Self {
            tenant_id,
            user_id: None,
            roles: Vec::new(),
        }
    }

    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        self.roles = roles;
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role("admin")
    }
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = PlatformError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let tenant_id = parts
            .headers
            .get(TENANT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| Uuid::parse_str(s.trim()).ok())
            .ok_or(ValidationError::Tenant)?;

        let user_id = match parts.headers.get(USER_HEADER) {
            None => None,
            Some(v) => {
                let raw = v.to_str().unwrap_or_default();
                Some(Uuid::parse_str(raw.trim()).map_err(|_| ValidationError::InvalidId {
                    value: raw.to_string(),
                })?)
            }
        };

        let roles = parts
            .headers
            .get(ROLES_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(|s| {
                s.split(',')
                    .map(|r| r.trim().to_ascii_lowercase())
                    .filter(|r| !r.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(TenantContext {
            tenant_id,
            user_id,
            roles,
        })
    }
}

/// Access policy for an operation.
#[derive(Debug, Clone)]
pub enum Policy {
    /// Any tenant-scoped request.
    Public,

    /// Requires an identified user.
    Authenticated,

    /// Requires one of the listed roles.
    HasRole(Vec<String>),
}

impl Policy {
    pub fn admin_only() -> Self {
        Policy::HasRole(vec!["admin".to_string()])
    }

    pub fn check(&self, ctx: &TenantContext) -> bool {
        match self {
            Policy::Public => true,
            Policy::Authenticated => ctx.user_id.is_some(),
            Policy::HasRole(required) => required.iter().any(|r| ctx.has_role(r)),
        }
    }

    /// Enforce the policy, rejecting the request as a business-rule
    /// violation when it fails.
    pub fn authorize(&self, ctx: &TenantContext) -> PlatformResult<()> {
        if self.check(ctx) {
            Ok(())
        } else {
            Err(PlatformError::business(match self {
                Policy::Public => "access denied".to_string(),
                Policy::Authenticated => "operation requires an identified user".to_string(),
                Policy::HasRole(roles) => {
                    format!("operation requires one of the roles {roles:?}")
                }
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(req: Request<()>) -> PlatformResult<TenantContext> {
        let (mut parts, _) = req.into_parts();
        TenantContext::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn extracts_tenant_user_and_roles() {
        let tenant = Uuid::new_v4();
        let user = Uuid::new_v4();
        let req = Request::builder()
            .header("X-Tenant-ID", tenant.to_string())
            .header("X-User-ID", user.to_string())
            .header("X-Roles", "Admin, accountant")
            .body(())
            .unwrap();

        let ctx = extract(req).await.unwrap();
        assert_eq!(ctx.tenant_id, tenant);
        assert_eq!(ctx.user_id, Some(user));
        assert!(ctx.is_admin());
        assert!(ctx.has_role("accountant"));
    }

    #[tokio::test]
    async fn missing_tenant_header_is_rejected() {
        let req = Request::builder().body(()).unwrap();
        let err = extract(req).await.unwrap_err();
        assert!(matches!(
            err,
            PlatformError::Validation(ValidationError::Tenant)
        ));
    }

    #[tokio::test]
    async fn malformed_tenant_header_is_rejected() {
        let req = Request::builder()
            .header("X-Tenant-ID", "not-a-uuid")
            .body(())
            .unwrap();
        assert!(extract(req).await.is_err());
    }

    #[tokio::test]
    async fn malformed_user_header_is_rejected() {
        let req = Request::builder()
            .header("X-Tenant-ID", Uuid::new_v4().to_string())
            .header("X-User-ID", "42")
            .body(())
            .unwrap();
        let err = extract(req).await.unwrap_err();
        assert!(matches!(
            err,
            PlatformError::Validation(ValidationError::InvalidId { .. })
        ));
    }

    #[test]
    fn policy_checks() {
        let tenant = Uuid::new_v4();
        let anonymous = TenantContext::new(tenant);
        let mut user = TenantContext::new(tenant).with_roles(vec!["accountant".to_string()]);
        user.user_id = Some(Uuid::new_v4());

        assert!(Policy::Public.check(&anonymous));
        assert!(!Policy::Authenticated.check(&anonymous));
        assert!(Policy::Authenticated.check(&user));
        assert!(Policy::HasRole(vec!["accountant".to_string()]).check(&user));
        assert!(!Policy::admin_only().check(&user));
    }

    #[test]
    fn authorize_failure_is_a_business_error() {
        let ctx = TenantContext::new(Uuid::new_v4());
        let err = Policy::admin_only().authorize(&ctx).unwrap_err();
        assert!(matches!(err, PlatformError::Business { .. }));
        assert!(err.to_string().contains("admin"));
    }
}
