#![forbid(unsafe_code)]

use pk_core::ids::TenantId;

/// What the external auth layer knows about the caller. Resolving it into a
/// [`SessionContext`] happens once per session, not once per call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Option<String>,
    pub tenant: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionError {
    NotAuthenticated,
    TenantNotFound,
    InvalidTenant,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAuthenticated => write!(f, "not authenticated"),
            Self::TenantNotFound => write!(f, "no tenant is associated with the principal"),
            Self::InvalidTenant => write!(f, "tenant id is not valid"),
        }
    }
}

impl std::error::Error for SessionError {}

/// A resolved session: authenticated user plus their tenant scope. Every
/// gateway call goes through this; there is no other way to name a tenant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionContext {
    tenant: TenantId,
    user_id: Option<String>,
}

impl SessionContext {
    pub fn resolve(principal: &Principal) -> Result<Self, SessionError> {
        if principal.user_id.as_deref().map(str::trim).unwrap_or("").is_empty() {
            return Err(SessionError::NotAuthenticated);
        }
        let Some(raw_tenant) = principal.tenant.as_deref() else {
            return Err(SessionError::TenantNotFound);
        };
        let tenant = TenantId::try_new(raw_tenant).map_err(|_| SessionError::InvalidTenant)?;
        Ok(Self {
            tenant,
            user_id: principal.user_id.clone(),
        })
    }

    pub fn tenant(&self) -> &TenantId {
        &self.tenant
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_requires_a_user() {
        let principal = Principal {
            user_id: None,
            tenant: Some("acme".to_string()),
        };
        assert_eq!(
            SessionContext::resolve(&principal),
            Err(SessionError::NotAuthenticated)
        );
    }

    #[test]
    fn resolve_requires_a_tenant() {
        let principal = Principal {
            user_id: Some("tech-4".to_string()),
            tenant: None,
        };
        assert_eq!(
            SessionContext::resolve(&principal),
            Err(SessionError::TenantNotFound)
        );
    }

    #[test]
    fn resolve_rejects_a_malformed_tenant() {
        let principal = Principal {
            user_id: Some("tech-4".to_string()),
            tenant: Some("no spaces allowed".to_string()),
        };
        assert_eq!(
            SessionContext::resolve(&principal),
            Err(SessionError::InvalidTenant)
        );
    }

    #[test]
    fn resolve_keeps_user_and_tenant() {
        let principal = Principal {
            user_id: Some("tech-4".to_string()),
            tenant: Some("acme".to_string()),
        };
        let session = SessionContext::resolve(&principal).expect("resolve");
        assert_eq!(session.tenant().as_str(), "acme");
        assert_eq!(session.user_id(), Some("tech-4"));
    }
}
