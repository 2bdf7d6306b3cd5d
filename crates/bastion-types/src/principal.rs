//! Principal types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::authority::{Authority, AuthoritySet};

/// Unique principal identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId(pub Uuid);

impl PrincipalId {
    /// Create a new random principal ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PrincipalId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for PrincipalId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// An identity known to the directory, with its granted authorities.
///
/// Loaded once per request and never mutated afterwards.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    /// Unique login name, also the token subject
    pub subject: String,
    /// PHC-formatted password hash
    pub credential_hash: String,
    pub authorities: AuthoritySet,
}

impl Principal {
    pub fn new(
        subject: impl Into<String>,
        credential_hash: impl Into<String>,
        authorities: AuthoritySet,
    ) -> Self {
        Self {
            id: PrincipalId::new(),
            subject: subject.into(),
            credential_hash: credential_hash.into(),
            authorities,
        }
    }

    /// Check if the principal holds the given authority
    pub fn has_authority(&self, authority: &Authority) -> bool {
        self.authorities.contains(authority)
    }
}

impl std::fmt::Debug for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Principal")
            .field("id", &self.id)
            .field("subject", &self.subject)
            .field("authorities", &self.authorities)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_credential_hash() {
        let principal = Principal::new(
            "admin",
            "$argon2id$v=19$secret-material",
            AuthoritySet::parse(["ROLE:ADMIN"]).unwrap(),
        );
        let debug = format!("{principal:?}");
        assert!(debug.contains("admin"));
        assert!(!debug.contains("secret-material"));
    }

    #[test]
    fn test_has_authority() {
        let principal = Principal::new(
            "lucas",
            "hash",
            AuthoritySet::parse(["ROLE:USER", "AUTHORITY_READ2"]).unwrap(),
        );
        assert!(principal.has_authority(&Authority::role("USER").unwrap()));
        assert!(!principal.has_authority(&Authority::role("ADMIN").unwrap()));
    }
}
