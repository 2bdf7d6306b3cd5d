//! Bastion Axum Integration
//!
//! Axum middleware and extractors for Bastion authentication and
//! route authorization.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use bastion_axum::{AuthLayer, Authenticated};
//! use axum::{Router, routing::get};
//!
//! async fn protected_handler(user: Authenticated) -> String {
//!     format!("Hello, {}!", user.subject)
//! }
//!
//! let app = Router::new()
//!     .route("/api/protected", get(protected_handler))
//!     .layer(AuthLayer::new(authenticator, Arc::new(policy)));
//! ```
//!
//! # Extractors
//!
//! - [`Authenticated`] - Requires an authenticated principal (401 if anonymous)
//! - [`MaybeAuthenticated`] - Optional principal (None if anonymous)

pub mod error;
pub mod extractors;
pub mod layer;

pub use error::{AuthRejection, ErrorBody, ErrorDetail};
pub use extractors::{Authenticated, MaybeAuthenticated};
pub use layer::{AuthLayer, AuthService, Clock};
