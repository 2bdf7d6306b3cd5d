//! Axum extractors for the authenticated principal.
//!
//! These read the [`AuthenticationContext`] that [`AuthLayer`](crate::AuthLayer)
//! stores in the request extensions.
//!
//! # Usage
//!
//! ```ignore
//! use bastion_axum::{Authenticated, MaybeAuthenticated};
//!
//! // 401 if the request is anonymous
//! async fn protected(user: Authenticated) -> String {
//!     format!("Hello, {}!", user.subject)
//! }
//!
//! async fn greeting(user: MaybeAuthenticated) -> String {
//!     match user.0 {
//!         Some(principal) => format!("Hello, {}!", principal.subject),
//!         None => "Hello, guest!".to_string(),
//!     }
//! }
//! ```

use std::ops::Deref;
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use bastion_auth_core::{AuthError, AuthenticationContext};
use bastion_types::Principal;

use crate::error::AuthRejection;

fn principal_from(parts: &Parts) -> Option<Arc<Principal>> {
    parts
        .extensions
        .get::<AuthenticationContext>()
        .and_then(|ctx| ctx.principal().cloned())
}

/// Extractor that requires an authenticated principal.
///
/// Returns 401 Unauthorized if the request is anonymous or did not pass
/// through the auth layer.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Arc<Principal>);

impl Deref for Authenticated {
    type Target = Principal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        principal_from(parts)
            .map(Self)
            .ok_or(AuthRejection(AuthError::Unauthorized))
    }
}

/// Extractor for optional authentication. Never rejects.
#[derive(Debug, Clone)]
pub struct MaybeAuthenticated(pub Option<Arc<Principal>>);

impl Deref for MaybeAuthenticated {
    type Target = Option<Arc<Principal>>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthenticated
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(principal_from(parts)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use axum::response::IntoResponse;
    use bastion_types::AuthoritySet;

    fn parts_with(ctx: Option<AuthenticationContext>) -> Parts {
        let mut req = Request::builder().uri("/").body(()).unwrap();
        if let Some(ctx) = ctx {
            req.extensions_mut().insert(ctx);
        }
        req.into_parts().0
    }

    fn lucas() -> Arc<Principal> {
        let authorities = AuthoritySet::parse(["ROLE:USER", "AUTHORITY_READ2"]).unwrap();
        Arc::new(Principal::new("lucas", "hash", authorities))
    }

    #[tokio::test]
    async fn test_authenticated_extracts_principal() {
        let mut parts = parts_with(Some(AuthenticationContext::authenticated(lucas())));
        let user = Authenticated::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.subject, "lucas");
    }

    #[tokio::test]
    async fn test_authenticated_rejects_anonymous() {
        let mut parts = parts_with(Some(AuthenticationContext::anonymous()));
        let err = Authenticated::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_authenticated_rejects_missing_context() {
        let mut parts = parts_with(None);
        assert!(Authenticated::from_request_parts(&mut parts, &()).await.is_err());
    }

    #[tokio::test]
    async fn test_maybe_authenticated() {
        let mut parts = parts_with(Some(AuthenticationContext::authenticated(lucas())));
        let user = MaybeAuthenticated::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.as_ref().map(|p| p.subject.as_str()), Some("lucas"));

        let mut parts = parts_with(None);
        let user = MaybeAuthenticated::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(user.is_none());
    }
}
