//! Credential login
//!
//! Exchanges a login name and password for a signed token.

use std::sync::Arc;

use bastion_types::{AuthoritySet, Principal};
use chrono::{DateTime, Utc};

use crate::config::AuthConfig;
use crate::directory::PrincipalDirectory;
use crate::password::CredentialHasher;
use crate::token::{IssuedToken, TokenCodec};
use crate::AuthError;

/// Verifies credentials and issues tokens.
///
/// Unknown login names and wrong passwords produce the same
/// [`AuthError::CredentialsInvalid`], and both pay for one password
/// verification: unknown names are checked against a decoy principal whose
/// hash uses the configured cost.
pub struct LoginOrchestrator<D: PrincipalDirectory> {
    codec: TokenCodec,
    issuer: String,
    ttl: chrono::Duration,
    directory: Arc<D>,
    decoy: Principal,
}

impl<D: PrincipalDirectory> LoginOrchestrator<D> {
    pub fn new(config: &AuthConfig, directory: Arc<D>) -> Result<Self, AuthError> {
        let ttl = chrono::Duration::from_std(config.token_ttl)
            .map_err(|_| AuthError::Configuration("token lifetime out of range".to_string()))?;

        let decoy_hash = CredentialHasher::new(config.hashing)?.hash("decoy-credential")?;

        Ok(Self {
            codec: config.codec(),
            issuer: config.issuer.clone(),
            ttl,
            directory,
            decoy: Principal::new("", decoy_hash, AuthoritySet::new()),
        })
    }

    /// Verify `password` for `login_name` and issue a token valid from `now`.
    pub async fn login(
        &self,
        login_name: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        let resolved = self.directory.resolve(login_name).await.map_err(|e| {
            tracing::error!(login = %login_name, error = %e, "Directory lookup failed during login");
            AuthError::from(e)
        })?;

        let Some(principal) = resolved else {
            // Same work as a wrong password; the result is ignored
            self.verify(&self.decoy, login_name, password).await?;
            tracing::debug!(login = %login_name, "Login failed: unknown login name");
            return Err(AuthError::CredentialsInvalid);
        };

        if !self.verify(&principal, login_name, password).await? {
            tracing::debug!(login = %login_name, "Login failed: password mismatch");
            return Err(AuthError::CredentialsInvalid);
        }

        let issued = self
            .codec
            .encode(&principal.subject, &self.issuer, self.ttl, now)?;

        tracing::info!(
            subject = %issued.subject,
            expires_at = %issued.expires_at,
            "Token issued"
        );
        Ok(issued)
    }

    async fn verify(
        &self,
        principal: &Principal,
        login_name: &str,
        password: &str,
    ) -> Result<bool, AuthError> {
        self.directory
            .verify_password(principal, password)
            .await
            .map_err(|e| {
                tracing::error!(login = %login_name, error = %e, "Password verification failed");
                AuthError::from(e)
            })
    }
}

impl<D: PrincipalDirectory> std::fmt::Debug for LoginOrchestrator<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginOrchestrator")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
