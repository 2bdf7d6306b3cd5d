//! Configuration types for token issuance and verification

use std::time::Duration;

use crate::crypto::SigningKey;
use crate::password::HashingParams;
use crate::token::TokenCodec;
use crate::AuthError;

/// Auth configuration
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Validated HMAC signing key
    pub signing_key: SigningKey,
    /// Issuer embedded in and required of every token
    pub issuer: String,
    /// Token lifetime
    pub token_ttl: Duration,
    /// Password hashing cost
    pub hashing: HashingParams,
}

impl AuthConfig {
    /// Default token lifetime (2 hours)
    pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(2 * 60 * 60);

    /// Create a new auth config, validating the secret and issuer.
    pub fn try_new(secret: impl AsRef<[u8]>, issuer: impl Into<String>) -> Result<Self, AuthError> {
        let signing_key =
            SigningKey::new(secret).map_err(|e| AuthError::Configuration(e.to_string()))?;

        let issuer = issuer.into();
        if issuer.trim().is_empty() {
            return Err(AuthError::Configuration("issuer must not be empty".to_string()));
        }

        Ok(Self {
            signing_key,
            issuer,
            token_ttl: Self::DEFAULT_TOKEN_TTL,
            hashing: HashingParams::default(),
        })
    }

    /// Set token lifetime. Must be at least one second.
    pub fn with_token_ttl(mut self, ttl: Duration) -> Result<Self, AuthError> {
        if ttl.as_secs() == 0 {
            return Err(AuthError::Configuration(
                "token lifetime must be at least one second".to_string(),
            ));
        }
        self.token_ttl = ttl;
        Ok(self)
    }

    /// Set password hashing cost
    pub fn with_hashing(mut self, hashing: HashingParams) -> Self {
        self.hashing = hashing;
        self
    }

    /// Token codec bound to this config's signing key
    pub fn codec(&self) -> TokenCodec {
        TokenCodec::new(self.signing_key.clone())
    }
}
