//! Configuration for the Auth API service.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use bastion_auth_core::{AuthConfig, HashingParams};

/// Auth API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// JSON file of principals to load; demo principals are seeded when unset
    pub principals_file: Option<PathBuf>,

    /// Auth core configuration
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Token signing (minimum 32 bytes)
        let secret = lookup("TOKEN_SECRET").ok_or(ConfigError::Missing("TOKEN_SECRET"))?;
        let issuer = lookup("TOKEN_ISSUER").ok_or(ConfigError::Missing("TOKEN_ISSUER"))?;

        // Token lifetime (default 2 hours)
        let ttl_secs: u64 = parse_or(&lookup, "TOKEN_TTL_SECS", 7200)?;

        let http_port = parse_or(&lookup, "HTTP_PORT", 8080)?;

        let principals_file = lookup("PRINCIPALS_FILE")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        // Argon2 cost for hashing seeded plaintext passwords
        let defaults = HashingParams::default();
        let hashing = HashingParams {
            m_cost: parse_or(&lookup, "ARGON2_M_COST", defaults.m_cost)?,
            t_cost: parse_or(&lookup, "ARGON2_T_COST", defaults.t_cost)?,
            p_cost: parse_or(&lookup, "ARGON2_P_COST", defaults.p_cost)?,
        };

        let auth = AuthConfig::try_new(secret, issuer)
            .and_then(|auth| auth.with_token_ttl(Duration::from_secs(ttl_secs)))
            .map_err(|e| ConfigError::AuthConfig(e.to_string()))?
            .with_hashing(hashing);

        Ok(Self {
            http_port,
            principals_file,
            auth,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Auth config error: {0}")]
    AuthConfig(String),
}
