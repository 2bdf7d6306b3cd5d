//! Bastion Auth Core - Authentication and authorization logic
//!
//! Token issuance and verification, per-request authentication, the route
//! authorization policy and credential login. Transport-agnostic: the axum
//! integration lives in `bastion-axum`.
//!
//! Request pipeline, in this order:
//! 1. [`RequestAuthenticator`] turns the `Authorization` header into an
//!    [`AuthenticationContext`]. It never rejects.
//! 2. [`AccessPolicy`] decides [`Decision::Allow`], `Unauthorized` or
//!    `Forbidden` for the route.

pub mod authenticator;
pub mod config;
pub mod context;
pub mod crypto;
pub mod directory;
pub mod error;
pub mod login;
pub mod password;
pub mod policy;
pub mod token;

pub use authenticator::{bearer_token, RequestAuthenticator};
pub use config::AuthConfig;
pub use context::AuthenticationContext;
pub use crypto::{constant_time_str_eq, SigningKey, SigningKeyError};
pub use directory::{DirectoryError, PrincipalDirectory};
pub use error::AuthError;
pub use login::LoginOrchestrator;
pub use password::{CredentialHasher, HashingParams};
pub use policy::{AccessPolicy, AccessPolicyBuilder, AccessPredicate, AccessRule, Decision, PathPattern, PolicyConfigError};
pub use token::{IssuedToken, TokenClaims, TokenCodec};
