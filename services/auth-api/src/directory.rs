//! In-memory principal directory
//!
//! Principals are loaded once at startup, either from a JSON seed file or
//! from the built-in demo set, and never change afterwards.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bastion_auth_core::{AuthError, CredentialHasher, DirectoryError, PrincipalDirectory};
use bastion_types::{AuthorityError, AuthoritySet, Principal};
use password_hash::PasswordHash;
use serde::Deserialize;

/// One entry of the principals seed file.
///
/// Exactly one of `password_hash` (a PHC string) and `password` (plaintext,
/// hashed at load) must be set.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrincipalSeed {
    pub subject: String,
    #[serde(default)]
    pub password_hash: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub authorities: Vec<String>,
}

impl PrincipalSeed {
    pub fn with_password(subject: &str, password: &str, authorities: &[&str]) -> Self {
        Self {
            subject: subject.to_string(),
            password_hash: None,
            password: Some(password.to_string()),
            authorities: authorities.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl std::fmt::Debug for PrincipalSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrincipalSeed")
            .field("subject", &self.subject)
            .field("authorities", &self.authorities)
            .finish_non_exhaustive()
    }
}

/// Errors loading the principal seed. All of them abort startup.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to read principals file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse principals file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Duplicate subject: {0}")]
    DuplicateSubject(String),

    #[error("Empty subject")]
    EmptySubject,

    #[error("Invalid authority for {subject}")]
    InvalidAuthority {
        subject: String,
        #[source]
        source: AuthorityError,
    },

    #[error("{0} must set exactly one of password_hash or password")]
    Credential(String),

    #[error("Stored hash for {0} is not a valid PHC string")]
    InvalidHash(String),

    #[error("Failed to hash password: {0}")]
    Hashing(#[from] AuthError),
}

/// Directory over an immutable map of principals keyed by subject.
pub struct InMemoryDirectory {
    principals: HashMap<String, Arc<Principal>>,
    hasher: CredentialHasher,
}

impl InMemoryDirectory {
    /// Build the directory from seed entries.
    pub fn from_seeds(seeds: Vec<PrincipalSeed>, hasher: CredentialHasher) -> Result<Self, SeedError> {
        let mut principals = HashMap::with_capacity(seeds.len());

        for seed in seeds {
            if seed.subject.trim().is_empty() {
                return Err(SeedError::EmptySubject);
            }
            if principals.contains_key(&seed.subject) {
                return Err(SeedError::DuplicateSubject(seed.subject));
            }

            let authorities =
                AuthoritySet::parse(&seed.authorities).map_err(|source| SeedError::InvalidAuthority {
                    subject: seed.subject.clone(),
                    source,
                })?;

            let credential_hash = match (seed.password_hash, seed.password) {
                (Some(phc), None) => {
                    PasswordHash::new(&phc).map_err(|_| SeedError::InvalidHash(seed.subject.clone()))?;
                    phc
                }
                (None, Some(password)) => hasher.hash(&password)?,
                _ => return Err(SeedError::Credential(seed.subject)),
            };

            let principal = Principal::new(seed.subject.clone(), credential_hash, authorities);
            principals.insert(seed.subject, Arc::new(principal));
        }

        tracing::info!(count = principals.len(), "Principal directory loaded");
        Ok(Self { principals, hasher })
    }

    /// Load principals from a JSON array of [`PrincipalSeed`].
    pub fn load(path: &Path, hasher: CredentialHasher) -> Result<Self, SeedError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let seeds: Vec<PrincipalSeed> = serde_json::from_str(&raw)?;
        Self::from_seeds(seeds, hasher)
    }

    /// Demo principals: `admin` and `lucas`, both with password `123`.
    pub fn demo(hasher: CredentialHasher) -> Result<Self, SeedError> {
        Self::from_seeds(
            vec![
                PrincipalSeed::with_password("admin", "123", &["ROLE:ADMIN", "AUTHORITY_READ1"]),
                PrincipalSeed::with_password("lucas", "123", &["ROLE:USER", "AUTHORITY_READ2"]),
            ],
            hasher,
        )
    }

    pub fn len(&self) -> usize {
        self.principals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.principals.is_empty()
    }
}

impl std::fmt::Debug for InMemoryDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryDirectory")
            .field("principals", &self.principals.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PrincipalDirectory for InMemoryDirectory {
    async fn resolve(&self, subject: &str) -> Result<Option<Arc<Principal>>, DirectoryError> {
        Ok(self.principals.get(subject).cloned())
    }

    async fn verify_password(&self, principal: &Principal, password: &str) -> Result<bool, DirectoryError> {
        // Argon2 is CPU bound; keep it off the async workers
        let hasher = self.hasher.clone();
        let phc = principal.credential_hash.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &phc))
            .await
            .map_err(|e| DirectoryError::Backend(format!("password verification task failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bastion_auth_core::HashingParams;
    use bastion_types::Authority;

    fn hasher() -> CredentialHasher {
        CredentialHasher::new(HashingParams {
            m_cost: 64,
            t_cost: 1,
            p_cost: 1,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_demo_directory() {
        let directory = InMemoryDirectory::demo(hasher()).unwrap();
        assert_eq!(directory.len(), 2);

        let admin = directory.resolve("admin").await.unwrap().unwrap();
        assert!(admin.has_authority(&Authority::role("ADMIN").unwrap()));
        assert!(admin.has_authority(&Authority::permission("AUTHORITY_READ1").unwrap()));
        assert!(directory.verify_password(&admin, "123").await.unwrap());
        assert!(!directory.verify_password(&admin, "1234").await.unwrap());

        assert!(directory.resolve("nobody").await.unwrap().is_none());
    }

    #[test]
    fn test_seed_file_format() {
        let phc = hasher().hash("s3cret").unwrap();
        let raw = format!(
            r#"[
                {{"subject": "alice", "password_hash": "{phc}", "authorities": ["ROLE:USER"]}},
                {{"subject": "bob", "password": "hunter2", "authorities": ["AUTHORITY_READ2"]}}
            ]"#
        );
        let seeds: Vec<PrincipalSeed> = serde_json::from_str(&raw).unwrap();
        let directory = InMemoryDirectory::from_seeds(seeds, hasher()).unwrap();
        assert_eq!(directory.len(), 2);
    }

    #[test]
    fn test_duplicate_subject_rejected() {
        let seeds = vec![
            PrincipalSeed::with_password("admin", "1", &[]),
            PrincipalSeed::with_password("admin", "2", &[]),
        ];
        assert!(matches!(
            InMemoryDirectory::from_seeds(seeds, hasher()),
            Err(SeedError::DuplicateSubject(s)) if s == "admin"
        ));
    }

    #[test]
    fn test_invalid_authority_rejected() {
        let seeds = vec![PrincipalSeed::with_password("admin", "1", &[""])];
        assert!(matches!(
            InMemoryDirectory::from_seeds(seeds, hasher()),
            Err(SeedError::InvalidAuthority { .. })
        ));
    }

    #[test]
    fn test_credential_must_be_exactly_one() {
        let mut seed = PrincipalSeed::with_password("admin", "1", &[]);
        seed.password_hash = Some("$argon2id$v=19$m=64,t=1,p=1$c2FsdHNhbHQ$aGFzaA".to_string());
        assert!(matches!(
            InMemoryDirectory::from_seeds(vec![seed], hasher()),
            Err(SeedError::Credential(_))
        ));

        let mut seed = PrincipalSeed::with_password("admin", "1", &[]);
        seed.password = None;
        assert!(matches!(
            InMemoryDirectory::from_seeds(vec![seed], hasher()),
            Err(SeedError::Credential(_))
        ));
    }

    #[test]
    fn test_invalid_stored_hash_rejected() {
        let mut seed = PrincipalSeed::with_password("admin", "1", &[]);
        seed.password = None;
        seed.password_hash = Some("plaintext".to_string());
        assert!(matches!(
            InMemoryDirectory::from_seeds(vec![seed], hasher()),
            Err(SeedError::InvalidHash(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = InMemoryDirectory::load(Path::new("/nonexistent/principals.json"), hasher());
        assert!(matches!(result, Err(SeedError::Io { .. })));
    }
}
