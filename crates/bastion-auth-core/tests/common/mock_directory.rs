//! In-memory principal directory for testing

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bastion_auth_core::{AuthConfig, CredentialHasher, DirectoryError, HashingParams, PrincipalDirectory};
use bastion_types::{AuthoritySet, Principal};

pub const SECRET: &str = "test-secret-that-is-at-least-32-bytes";
pub const ISSUER: &str = "bastion-test";

/// Cheap Argon2 parameters so tests stay fast
#[allow(dead_code)]
pub fn cheap_hashing() -> HashingParams {
    HashingParams {
        m_cost: 64,
        t_cost: 1,
        p_cost: 1,
    }
}

#[allow(dead_code)]
pub fn test_config() -> AuthConfig {
    AuthConfig::try_new(SECRET, ISSUER)
        .unwrap()
        .with_hashing(cheap_hashing())
}

/// Directory backed by a HashMap, with a switch to simulate backend outages
/// and a counter of password verifications
#[derive(Default)]
pub struct MockDirectory {
    principals: HashMap<String, Arc<Principal>>,
    hasher: CredentialHasher,
    unavailable: AtomicBool,
    verifications: AtomicUsize,
}

#[allow(dead_code)]
impl MockDirectory {
    pub fn new() -> Self {
        Self {
            principals: HashMap::new(),
            hasher: CredentialHasher::new(cheap_hashing()).unwrap(),
            unavailable: AtomicBool::new(false),
            verifications: AtomicUsize::new(0),
        }
    }

    /// Directory with `admin` and `lucas`, both with password `123`
    pub fn seeded() -> Self {
        Self::new()
            .with_principal("admin", "123", &["ROLE:ADMIN", "AUTHORITY_READ1"])
            .with_principal("lucas", "123", &["ROLE:USER", "AUTHORITY_READ2"])
    }

    pub fn with_principal(mut self, subject: &str, password: &str, authorities: &[&str]) -> Self {
        let hash = self.hasher.hash(password).unwrap();
        let principal = Principal::new(subject, hash, AuthoritySet::parse(authorities).unwrap());
        self.principals.insert(subject.to_string(), Arc::new(principal));
        self
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of password verifications performed so far
    pub fn verification_count(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), DirectoryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DirectoryError::Backend("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PrincipalDirectory for MockDirectory {
    async fn resolve(&self, subject: &str) -> Result<Option<Arc<Principal>>, DirectoryError> {
        self.check_available()?;
        Ok(self.principals.get(subject).cloned())
    }

    async fn verify_password(
        &self,
        principal: &Principal,
        password: &str,
    ) -> Result<bool, DirectoryError> {
        self.check_available()?;
        self.verifications.fetch_add(1, Ordering::SeqCst);
        Ok(self.hasher.verify(password, &principal.credential_hash))
    }
}
