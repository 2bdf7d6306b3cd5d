//! Auth errors

use thiserror::Error;

use crate::directory::DirectoryError;

/// Authentication and authorization errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Login failed. Never says whether the login name exists.
    #[error("invalid credentials")]
    CredentialsInvalid,

    /// Token is not a well-formed signed token
    #[error("malformed token")]
    TokenMalformed,

    /// Token signature does not match
    #[error("bad token signature")]
    TokenBadSignature,

    /// Token has expired
    #[error("token expired")]
    TokenExpired,

    /// Token was issued by someone else
    #[error("token issuer mismatch")]
    TokenIssuerMismatch,

    /// Token subject is unknown to the directory
    #[error("principal not found")]
    PrincipalNotFound,

    /// No verified identity at a gate requiring one
    #[error("authentication required")]
    Unauthorized,

    /// Verified identity without sufficient privilege
    #[error("access denied")]
    Forbidden,

    /// Directory backend failure
    #[error("directory error: {0}")]
    Directory(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl AuthError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::CredentialsInvalid
            | Self::TokenMalformed
            | Self::TokenBadSignature
            | Self::TokenExpired
            | Self::TokenIssuerMismatch
            | Self::PrincipalNotFound
            | Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::Directory(_) | Self::Configuration(_) => 500,
        }
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CredentialsInvalid => "INVALID_CREDENTIALS",
            Self::TokenMalformed => "TOKEN_MALFORMED",
            Self::TokenBadSignature => "TOKEN_BAD_SIGNATURE",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::TokenIssuerMismatch => "TOKEN_ISSUER_MISMATCH",
            Self::PrincipalNotFound => "PRINCIPAL_NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::Directory(_) => "DIRECTORY_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }
}

impl From<DirectoryError> for AuthError {
    fn from(err: DirectoryError) -> Self {
        Self::Directory(err.to_string())
    }
}
