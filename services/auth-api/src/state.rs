//! Application state

use std::sync::Arc;

use bastion_auth_core::{AccessPolicy, AuthError, LoginOrchestrator, PolicyConfigError, RequestAuthenticator};

use crate::config::Config;
use crate::directory::InMemoryDirectory;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Credential login
    pub login: Arc<LoginOrchestrator<InMemoryDirectory>>,
    /// Per-request bearer token authentication
    pub authenticator: RequestAuthenticator<InMemoryDirectory>,
    /// Route authorization rules
    pub policy: Arc<AccessPolicy>,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state with the service's route policy.
    pub fn new(config: Config, directory: Arc<InMemoryDirectory>) -> Result<Self, StateError> {
        let policy = crate::access_policy()?;
        Self::with_policy(config, directory, policy)
    }

    /// Create new application state with an explicit policy
    pub fn with_policy(
        config: Config,
        directory: Arc<InMemoryDirectory>,
        policy: AccessPolicy,
    ) -> Result<Self, StateError> {
        let login = LoginOrchestrator::new(&config.auth, Arc::clone(&directory))?;
        let authenticator = RequestAuthenticator::new(&config.auth, directory);

        Ok(Self {
            login: Arc::new(login),
            authenticator,
            policy: Arc::new(policy),
            config: Arc::new(config),
        })
    }
}

/// Startup error building the state
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Invalid access policy: {0}")]
    Policy(#[from] PolicyConfigError),

    #[error("Auth setup failed: {0}")]
    Auth(#[from] AuthError),
}
