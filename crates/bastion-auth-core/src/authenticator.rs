//! Per-request authentication
//!
//! Turns a raw `Authorization` header into an [`AuthenticationContext`].
//! Every failure degrades to an anonymous context; rejecting requests is
//! left to the policy.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::AuthConfig;
use crate::context::AuthenticationContext;
use crate::directory::PrincipalDirectory;
use crate::token::TokenCodec;
use crate::AuthError;

const BEARER_SCHEME: &str = "Bearer";

/// Authenticates requests from bearer tokens.
pub struct RequestAuthenticator<D: PrincipalDirectory> {
    codec: TokenCodec,
    issuer: String,
    directory: Arc<D>,
}

impl<D: PrincipalDirectory> RequestAuthenticator<D> {
    pub fn new(config: &AuthConfig, directory: Arc<D>) -> Self {
        Self {
            codec: config.codec(),
            issuer: config.issuer.clone(),
            directory,
        }
    }

    /// Build the context for one request. Never fails.
    pub async fn authenticate(
        &self,
        authorization: Option<&str>,
        now: DateTime<Utc>,
    ) -> AuthenticationContext {
        let Some(token) = authorization.and_then(bearer_token) else {
            return AuthenticationContext::anonymous();
        };

        match self.resolve(token, now).await {
            Ok(ctx) => ctx,
            Err(AuthError::Directory(e)) => {
                tracing::warn!(error = %e, "Directory lookup failed, treating request as anonymous");
                AuthenticationContext::anonymous()
            }
            Err(e) => {
                tracing::debug!(reason = e.error_code(), "Bearer token rejected, treating request as anonymous");
                AuthenticationContext::anonymous()
            }
        }
    }

    async fn resolve(&self, token: &str, now: DateTime<Utc>) -> Result<AuthenticationContext, AuthError> {
        let subject = self.codec.decode(token, &self.issuer, now)?;

        let principal = self
            .directory
            .resolve(&subject)
            .await?
            .ok_or(AuthError::PrincipalNotFound)?;

        tracing::debug!(subject = %principal.subject, "Request authenticated");
        Ok(AuthenticationContext::authenticated(principal))
    }
}

impl<D: PrincipalDirectory> Clone for RequestAuthenticator<D> {
    fn clone(&self) -> Self {
        Self {
            codec: self.codec.clone(),
            issuer: self.issuer.clone(),
            directory: Arc::clone(&self.directory),
        }
    }
}

impl<D: PrincipalDirectory> std::fmt::Debug for RequestAuthenticator<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestAuthenticator")
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

/// Extract the token from a `Bearer` authorization value.
///
/// The scheme name is matched case-insensitively. Returns `None` for other
/// schemes and for an empty token.
pub fn bearer_token(authorization: &str) -> Option<&str> {
    let (scheme, token) = authorization.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
