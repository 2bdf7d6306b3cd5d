//! Authority types
//!
//! Roles and plain permissions share one type. The string form is what gets
//! stored and sent over the wire; a role is written with the reserved
//! [`ROLE_MARKER`] prefix. Parsing happens once, here, so nothing downstream
//! ever looks at prefixes again.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reserved prefix that puts an authority in the role namespace.
pub const ROLE_MARKER: &str = "ROLE:";

/// A single granted authority
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Authority {
    /// Role-namespaced authority (`ROLE:ADMIN` is `Role("ADMIN")`)
    Role(String),
    /// Plain permission (`AUTHORITY_READ1`)
    Permission(String),
}

/// Errors raised when building an authority from a name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorityError {
    #[error("authority name is empty")]
    Empty,

    #[error("role name '{0}' already carries the '{ROLE_MARKER}' marker")]
    MarkedRoleName(String),
}

impl Authority {
    /// Parse the storage form of an authority.
    pub fn parse(raw: &str) -> Result<Self, AuthorityError> {
        match raw.strip_prefix(ROLE_MARKER) {
            Some(role) => Self::role(role),
            None => Self::permission(raw),
        }
    }

    /// Build a role authority from a bare role name (`ADMIN`, not `ROLE:ADMIN`).
    pub fn role(name: impl Into<String>) -> Result<Self, AuthorityError> {
        let name = name.into();
        if name.is_empty() {
            return Err(AuthorityError::Empty);
        }
        if name.starts_with(ROLE_MARKER) {
            return Err(AuthorityError::MarkedRoleName(name));
        }
        Ok(Self::Role(name))
    }

    /// Build a plain permission. Names carrying the role marker are parsed as roles.
    pub fn permission(name: impl Into<String>) -> Result<Self, AuthorityError> {
        let name = name.into();
        if name.is_empty() {
            return Err(AuthorityError::Empty);
        }
        if let Some(role) = name.strip_prefix(ROLE_MARKER) {
            return Self::role(role);
        }
        Ok(Self::Permission(name))
    }

    /// Bare name without namespace
    pub fn name(&self) -> &str {
        match self {
            Self::Role(name) | Self::Permission(name) => name,
        }
    }

    pub fn is_role(&self) -> bool {
        matches!(self, Self::Role(_))
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role(name) => write!(f, "{ROLE_MARKER}{name}"),
            Self::Permission(name) => write!(f, "{name}"),
        }
    }
}

impl FromStr for Authority {
    type Err = AuthorityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Authority {
    type Error = AuthorityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Authority> for String {
    fn from(authority: Authority) -> Self {
        authority.to_string()
    }
}

/// Set of authorities held by a principal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthoritySet(BTreeSet<Authority>);

impl AuthoritySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a list of storage-form authority strings
    pub fn parse<I, S>(raw: I) -> Result<Self, AuthorityError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raw.into_iter()
            .map(|s| Authority::parse(s.as_ref()))
            .collect::<Result<BTreeSet<_>, _>>()
            .map(Self)
    }

    pub fn contains(&self, authority: &Authority) -> bool {
        self.0.contains(authority)
    }

    /// True if at least one of `wanted` is held
    pub fn contains_any<'a>(&self, wanted: impl IntoIterator<Item = &'a Authority>) -> bool {
        wanted.into_iter().any(|a| self.0.contains(a))
    }

    /// Role names held, without the marker
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter(|a| a.is_role()).map(Authority::name)
    }

    /// Plain permissions held
    pub fn permissions(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter(|a| !a.is_role()).map(Authority::name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Authority> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Authority> for AuthoritySet {
    fn from_iter<T: IntoIterator<Item = Authority>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
