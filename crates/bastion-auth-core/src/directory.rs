//! Principal directory interface
//!
//! The credential store is a collaborator: this crate only defines what it
//! must answer. Implementations live with the service that owns the data.

use std::sync::Arc;

use async_trait::async_trait;
use bastion_types::Principal;
use thiserror::Error;

/// Directory backend errors
#[derive(Error, Debug)]
pub enum DirectoryError {
    #[error("directory backend error: {0}")]
    Backend(String),
}

/// Resolves subjects to principals and verifies credentials.
///
/// Implementations must be safe for concurrent readers and must not hold a
/// lock across calls. `verify_password` may block on a slow hash; async
/// implementations should move that work off the runtime threads.
#[async_trait]
pub trait PrincipalDirectory: Send + Sync {
    /// Find a principal by subject (login name)
    async fn resolve(&self, subject: &str) -> Result<Option<Arc<Principal>>, DirectoryError>;

    /// Check `password` against the principal's stored credential hash
    async fn verify_password(
        &self,
        principal: &Principal,
        password: &str,
    ) -> Result<bool, DirectoryError>;
}

#[async_trait]
impl<T: PrincipalDirectory + ?Sized> PrincipalDirectory for Arc<T> {
    async fn resolve(&self, subject: &str) -> Result<Option<Arc<Principal>>, DirectoryError> {
        (**self).resolve(subject).await
    }

    async fn verify_password(
        &self,
        principal: &Principal,
        password: &str,
    ) -> Result<bool, DirectoryError> {
        (**self).verify_password(principal, password).await
    }
}
