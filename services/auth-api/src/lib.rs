//! Bastion Auth API
//!
//! Credential login plus a set of routes guarded by role and authority rules.
//!
//! ## Endpoints
//!
//! - `POST /auth/login` - Exchange `{login, password}` for a bearer token (public)
//! - `POST /auth/protected` - Any authenticated principal
//! - `POST /auth/adminRole` - Role `ADMIN`
//! - `POST /auth/userRole` - Role `USER`
//! - `POST /auth/authorityRead1` - Authority `AUTHORITY_READ1`
//! - `POST /auth/authorityRead2` - Authority `AUTHORITY_READ2`
//! - `POST /auth/userOrAdminRole` - Role `ADMIN` or `USER`
//! - `POST /auth/authorityRead1or2` - Authority `AUTHORITY_READ1` or `AUTHORITY_READ2`
//! - `GET /health` - Liveness probe (public)
//!
//! Any other route requires authentication.

pub mod config;
pub mod directory;
pub mod error;
pub mod handlers;
pub mod state;

use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use bastion_auth_core::{AccessPolicy, AccessPredicate, PolicyConfigError};
use bastion_axum::AuthLayer;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use config::{Config, ConfigError};
pub use directory::{InMemoryDirectory, PrincipalSeed, SeedError};
pub use error::{ApiError, ApiResult};
pub use state::{AppState, StateError};

/// Route authorization rules for this service
pub fn access_policy() -> Result<AccessPolicy, PolicyConfigError> {
    AccessPolicy::builder()
        .rule(Method::POST, "/auth/login", AccessPredicate::Public)
        .rule(Method::POST, "/auth/protected", AccessPredicate::RequireAuthenticated)
        .rule(Method::POST, "/auth/adminRole", AccessPredicate::role("ADMIN"))
        .rule(Method::POST, "/auth/userRole", AccessPredicate::role("USER"))
        .rule(Method::POST, "/auth/authorityRead1", AccessPredicate::authority("AUTHORITY_READ1"))
        .rule(Method::POST, "/auth/authorityRead2", AccessPredicate::authority("AUTHORITY_READ2"))
        .rule(Method::POST, "/auth/userOrAdminRole", AccessPredicate::any_role(["ADMIN", "USER"]))
        .rule(
            Method::POST,
            "/auth/authorityRead1or2",
            AccessPredicate::any_authority(["AUTHORITY_READ1", "AUTHORITY_READ2"]),
        )
        .rule(Method::GET, "/health", AccessPredicate::Public)
        .build()
}

/// Build the HTTP router
pub fn app(state: AppState) -> Router {
    let auth = AuthLayer::new(state.authenticator.clone(), Arc::clone(&state.policy));

    // Outermost first
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(auth);

    Router::new()
        .route("/auth/login", post(handlers::login))
        .route("/auth/protected", post(handlers::protected))
        .route("/auth/adminRole", post(handlers::admin_role))
        .route("/auth/userRole", post(handlers::user_role))
        .route("/auth/authorityRead1", post(handlers::authority_read1))
        .route("/auth/authorityRead2", post(handlers::authority_read2))
        .route("/auth/userOrAdminRole", post(handlers::user_or_admin_role))
        .route("/auth/authorityRead1or2", post(handlers::authority_read1_or_2))
        .route("/health", get(handlers::health))
        .layer(middleware)
        .with_state(state)
}
