//! Request-scoped authentication context

use std::sync::Arc;

use bastion_types::{Authority, Principal};

/// Who is making the current request, if anyone.
///
/// Built exactly once per request by the authenticator and dropped with the
/// request. Never stored outside that request.
#[derive(Debug, Clone, Default)]
pub struct AuthenticationContext {
    principal: Option<Arc<Principal>>,
}

impl AuthenticationContext {
    /// Context for a request without a verified identity
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Context for a request with a resolved principal
    pub fn authenticated(principal: Arc<Principal>) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn principal(&self) -> Option<&Arc<Principal>> {
        self.principal.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.principal.is_some()
    }

    /// Subject of the principal, if any
    pub fn subject(&self) -> Option<&str> {
        self.principal.as_deref().map(|p| p.subject.as_str())
    }

    /// True only for an authenticated principal holding at least one of `wanted`
    pub fn holds_any(&self, wanted: &[Authority]) -> bool {
        self.principal
            .as_deref()
            .is_some_and(|p| p.authorities.contains_any(wanted))
    }
}
