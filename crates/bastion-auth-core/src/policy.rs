//! Route authorization policy
//!
//! An ordered table of `(method, path pattern) -> predicate`. The first
//! matching rule decides; requests matching no rule must be authenticated.
//!
//! Rules are validated when the policy is built, so a bad role name stops
//! the service at startup instead of failing requests later.
//!
//! ```
//! use bastion_auth_core::{AccessPolicy, AccessPredicate, AuthenticationContext, Decision};
//! use http::Method;
//!
//! let policy = AccessPolicy::builder()
//!     .rule(Method::POST, "/auth/login", AccessPredicate::Public)
//!     .rule(Method::POST, "/auth/adminRole", AccessPredicate::role("ADMIN"))
//!     .build()
//!     .unwrap();
//!
//! let anonymous = AuthenticationContext::anonymous();
//! assert_eq!(policy.decide(&Method::POST, "/auth/login", &anonymous), Decision::Allow);
//! assert_eq!(policy.decide(&Method::POST, "/auth/adminRole", &anonymous), Decision::Unauthorized);
//! ```

use bastion_types::{Authority, AuthorityError};
use http::Method;
use thiserror::Error;

use crate::context::AuthenticationContext;
use crate::AuthError;

/// Access predicate as declared in configuration.
///
/// Role names are bare (`ADMIN`). Authority names are raw storage strings, so
/// `RequireAuthority("ROLE:ADMIN")` targets the ADMIN role directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessPredicate {
    Public,
    RequireAuthenticated,
    RequireRole(String),
    RequireAnyRole(Vec<String>),
    RequireAuthority(String),
    RequireAnyAuthority(Vec<String>),
}

impl AccessPredicate {
    pub fn role(name: impl Into<String>) -> Self {
        Self::RequireRole(name.into())
    }

    pub fn any_role<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::RequireAnyRole(names.into_iter().map(Into::into).collect())
    }

    pub fn authority(name: impl Into<String>) -> Self {
        Self::RequireAuthority(name.into())
    }

    pub fn any_authority<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::RequireAnyAuthority(names.into_iter().map(Into::into).collect())
    }

    fn compile(&self) -> Result<Requirement, PolicyConfigError> {
        let requirement = match self {
            Self::Public => Requirement::Public,
            Self::RequireAuthenticated => Requirement::Authenticated,
            Self::RequireRole(name) => Requirement::AnyOf(vec![role(name)?]),
            Self::RequireAnyRole(names) => Requirement::AnyOf(non_empty(names, role)?),
            Self::RequireAuthority(name) => Requirement::AnyOf(vec![authority(name)?]),
            Self::RequireAnyAuthority(names) => Requirement::AnyOf(non_empty(names, authority)?),
        };
        Ok(requirement)
    }
}

fn role(name: &str) -> Result<Authority, PolicyConfigError> {
    Authority::role(name).map_err(|source| PolicyConfigError::InvalidAuthority {
        name: name.to_string(),
        source,
    })
}

fn authority(name: &str) -> Result<Authority, PolicyConfigError> {
    Authority::parse(name).map_err(|source| PolicyConfigError::InvalidAuthority {
        name: name.to_string(),
        source,
    })
}

fn non_empty(
    names: &[String],
    parse: fn(&str) -> Result<Authority, PolicyConfigError>,
) -> Result<Vec<Authority>, PolicyConfigError> {
    if names.is_empty() {
        return Err(PolicyConfigError::EmptyAlternatives);
    }
    names.iter().map(|name| parse(name)).collect()
}

/// Compiled predicate. Role and authority checks collapse into one
/// any-of membership test over tagged authorities.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Requirement {
    Public,
    Authenticated,
    AnyOf(Vec<Authority>),
}

impl Requirement {
    fn evaluate(&self, ctx: &AuthenticationContext) -> Decision {
        match self {
            Self::Public => Decision::Allow,
            Self::Authenticated if ctx.is_authenticated() => Decision::Allow,
            Self::Authenticated => Decision::Unauthorized,
            Self::AnyOf(_) if !ctx.is_authenticated() => Decision::Unauthorized,
            Self::AnyOf(wanted) if ctx.holds_any(wanted) => Decision::Allow,
            Self::AnyOf(_) => Decision::Forbidden,
        }
    }
}

/// Outcome of evaluating the policy for one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// No verified identity
    Unauthorized,
    /// Verified identity lacking privilege
    Forbidden,
}

impl Decision {
    pub fn into_result(self) -> Result<(), AuthError> {
        match self {
            Self::Allow => Ok(()),
            Self::Unauthorized => Err(AuthError::Unauthorized),
            Self::Forbidden => Err(AuthError::Forbidden),
        }
    }
}

/// Errors raised while building a policy. Fatal at startup.
#[derive(Debug, Error)]
pub enum PolicyConfigError {
    #[error("invalid authority '{name}' in access rule: {source}")]
    InvalidAuthority {
        name: String,
        #[source]
        source: AuthorityError,
    },

    #[error("access rule lists no alternatives")]
    EmptyAlternatives,

    #[error("invalid path pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: &'static str },
}

/// Path pattern over `/`-separated segments.
///
/// A literal segment matches itself, `*` matches exactly one segment and a
/// trailing `**` matches any number of remaining segments (including none).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Single,
    Rest,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, PolicyConfigError> {
        let invalid = |reason| PolicyConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };

        if !pattern.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }

        let segments: Vec<Segment> = split_path(pattern)
            .map(|s| match s {
                "**" => Segment::Rest,
                "*" => Segment::Single,
                literal => Segment::Literal(literal.to_string()),
            })
            .collect();

        if let Some(pos) = segments.iter().position(|s| *s == Segment::Rest) {
            if pos != segments.len() - 1 {
                return Err(invalid("'**' is only allowed as the last segment"));
            }
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        let mut path = split_path(path);
        for segment in &self.segments {
            match segment {
                Segment::Rest => return true,
                Segment::Single => {
                    if path.next().is_none() {
                        return false;
                    }
                }
                Segment::Literal(expected) => {
                    if path.next() != Some(expected.as_str()) {
                        return false;
                    }
                }
            }
        }
        path.next().is_none()
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

fn split_path(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// One compiled entry of the policy table
#[derive(Debug, Clone)]
pub struct AccessRule {
    /// `None` matches any method
    method: Option<Method>,
    pattern: PathPattern,
    predicate: AccessPredicate,
    requirement: Requirement,
}

impl AccessRule {
    fn matches(&self, method: &Method, path: &str) -> bool {
        self.method.as_ref().map_or(true, |m| m == method) && self.pattern.matches(path)
    }

    pub fn method(&self) -> Option<&Method> {
        self.method.as_ref()
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn predicate(&self) -> &AccessPredicate {
        &self.predicate
    }
}

/// Immutable, ordered authorization table
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
    fallback: Requirement,
}

impl AccessPolicy {
    pub fn builder() -> AccessPolicyBuilder {
        AccessPolicyBuilder::default()
    }

    /// Decide whether the request may proceed. Pure; safe to call concurrently.
    pub fn decide(&self, method: &Method, path: &str, ctx: &AuthenticationContext) -> Decision {
        self.rules
            .iter()
            .find(|rule| rule.matches(method, path))
            .map_or(&self.fallback, |rule| &rule.requirement)
            .evaluate(ctx)
    }

    pub fn rules(&self) -> &[AccessRule] {
        &self.rules
    }
}

/// Collects rule declarations in order; validation happens in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct AccessPolicyBuilder {
    declared: Vec<(Option<Method>, String, AccessPredicate)>,
}

impl AccessPolicyBuilder {
    /// Add a rule for one method
    pub fn rule(mut self, method: Method, pattern: impl Into<String>, predicate: AccessPredicate) -> Self {
        self.declared.push((Some(method), pattern.into(), predicate));
        self
    }

    /// Add a rule for every method
    pub fn any_method(mut self, pattern: impl Into<String>, predicate: AccessPredicate) -> Self {
        self.declared.push((None, pattern.into(), predicate));
        self
    }

    /// Validate and compile all rules. Returns the first configuration error.
    pub fn build(self) -> Result<AccessPolicy, PolicyConfigError> {
        let rules = self
            .declared
            .into_iter()
            .map(|(method, pattern, predicate)| {
                Ok(AccessRule {
                    method,
                    pattern: PathPattern::parse(&pattern)?,
                    requirement: predicate.compile()?,
                    predicate,
                })
            })
            .collect::<Result<Vec<_>, PolicyConfigError>>()?;

        Ok(AccessPolicy {
            rules,
            fallback: Requirement::Authenticated,
        })
    }
}
