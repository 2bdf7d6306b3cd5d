//! Signed bearer tokens
//!
//! Tokens are HS256 JWTs carrying `iss`, `sub`, `iat` and `exp`. The
//! registered claims are whole seconds; `exp_nsec` carries the sub-second
//! part of the expiry so a token lives for exactly its lifetime.
//!
//! Verification order is fixed: structure, signature, issuer, expiry. The
//! current time is always passed in by the caller.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::crypto::{constant_time_str_eq, SigningKey};
use crate::AuthError;

/// Claims embedded in every token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Issuer
    pub iss: String,
    /// Subject (principal login name)
    pub sub: String,
    /// Issued at timestamp (seconds)
    pub iat: i64,
    /// Expiration timestamp (seconds, rounded down)
    pub exp: i64,
    /// Nanoseconds past `exp` at which the token expires
    #[serde(default)]
    pub exp_nsec: u32,
}

/// A freshly issued token together with its decoded metadata
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Compact serialized token, as sent in `Authorization: Bearer`
    pub token: String,
    pub issuer: String,
    pub subject: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies tokens with a single symmetric key.
///
/// Pure and lock-free; clone freely across tasks.
#[derive(Clone)]
pub struct TokenCodec {
    key: SigningKey,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec for the given key
    pub fn new(key: SigningKey) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry and issuer are checked against explicit inputs in `decode`
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self { key, validation }
    }

    /// Issue a token for `subject`, valid from `now` for `ttl`.
    pub fn encode(
        &self,
        subject: &str,
        issuer: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        if ttl.num_seconds() < 1 {
            return Err(AuthError::Configuration(
                "token lifetime must be at least one second".to_string(),
            ));
        }

        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Configuration("token lifetime overflows".to_string()))?;

        let claims = TokenClaims {
            iss: issuer.to_string(),
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            exp_nsec: expires_at.timestamp_subsec_nanos(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, self.key.encoding())
            .map_err(|e| {
                tracing::error!("Failed to sign token: {}", e);
                AuthError::Configuration("failed to sign token".to_string())
            })?;

        Ok(IssuedToken {
            token,
            issuer: claims.iss,
            subject: claims.sub,
            issued_at: now,
            expires_at,
        })
    }

    /// Verify `token` and return its subject.
    pub fn decode(&self, token: &str, issuer: &str, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = self.verify(token)?;

        if !constant_time_str_eq(&claims.iss, issuer) {
            tracing::debug!(token_issuer = %claims.iss, "Token issuer mismatch");
            return Err(AuthError::TokenIssuerMismatch);
        }

        let expires_at =
            DateTime::from_timestamp(claims.exp, claims.exp_nsec).ok_or(AuthError::TokenMalformed)?;
        if now >= expires_at {
            return Err(AuthError::TokenExpired);
        }

        Ok(claims.sub)
    }

    /// Check structure and signature, returning the embedded claims unvalidated.
    fn verify(&self, token: &str) -> Result<TokenClaims, AuthError> {
        jsonwebtoken::decode::<TokenClaims>(token, self.key.decoding(), &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token verification failed: {}", e);
                match e.kind() {
                    ErrorKind::InvalidSignature => AuthError::TokenBadSignature,
                    _ => AuthError::TokenMalformed,
                }
            })
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
