//! Tower middleware layer for authentication and authorization.
//!
//! [`AuthLayer`] runs two stages on every request:
//!
//! 1. **Authenticate**: the `Authorization` header is resolved to an
//!    [`AuthenticationContext`]. Bad or missing tokens yield an anonymous
//!    context, never an error.
//! 2. **Authorize**: the [`AccessPolicy`] decides on method, path and context.
//!
//! Allowed requests reach the inner service with the context stored in the
//! request extensions. Denied requests are answered with 401 or 403 and the
//! inner service is not called.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::{IntoResponse, Response};
use bastion_auth_core::{AccessPolicy, AuthenticationContext, PrincipalDirectory, RequestAuthenticator};
use chrono::{DateTime, Utc};
use tower::{Layer, Service};

use crate::error::AuthRejection;

/// Source of the current time for token expiry checks
pub type Clock = fn() -> DateTime<Utc>;

/// Tower layer that authenticates and authorizes requests.
pub struct AuthLayer<D: PrincipalDirectory> {
    authenticator: RequestAuthenticator<D>,
    policy: Arc<AccessPolicy>,
    clock: Clock,
}

impl<D: PrincipalDirectory> AuthLayer<D> {
    /// Create a layer using the system clock.
    #[must_use]
    pub fn new(authenticator: RequestAuthenticator<D>, policy: Arc<AccessPolicy>) -> Self {
        Self {
            authenticator,
            policy,
            clock: Utc::now,
        }
    }

    /// Replace the clock used for expiry checks.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }
}

impl<D: PrincipalDirectory> Clone for AuthLayer<D> {
    fn clone(&self) -> Self {
        Self {
            authenticator: self.authenticator.clone(),
            policy: Arc::clone(&self.policy),
            clock: self.clock,
        }
    }
}

impl<S, D: PrincipalDirectory> Layer<S> for AuthLayer<D> {
    type Service = AuthService<S, D>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            authenticator: self.authenticator.clone(),
            policy: Arc::clone(&self.policy),
            clock: self.clock,
        }
    }
}

/// The authentication and authorization service.
pub struct AuthService<S, D: PrincipalDirectory> {
    inner: S,
    authenticator: RequestAuthenticator<D>,
    policy: Arc<AccessPolicy>,
    clock: Clock,
}

impl<S: Clone, D: PrincipalDirectory> Clone for AuthService<S, D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            authenticator: self.authenticator.clone(),
            policy: Arc::clone(&self.policy),
            clock: self.clock,
        }
    }
}

impl<S, D> Service<Request<Body>> for AuthService<S, D>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    D: PrincipalDirectory + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        // The clone may not be ready; keep the one poll_ready was called on
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let authenticator = self.authenticator.clone();
        let policy = Arc::clone(&self.policy);
        let now = (self.clock)();

        Box::pin(async move {
            let authorization = req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned);

            let ctx = authenticator.authenticate(authorization.as_deref(), now).await;
            let decision = policy.decide(req.method(), req.uri().path(), &ctx);

            match decision.into_result() {
                Ok(()) => {
                    req.extensions_mut().insert(ctx);
                    inner.call(req).await
                }
                Err(err) => {
                    tracing::debug!(
                        method = %req.method(),
                        path = %req.uri().path(),
                        subject = ctx.subject().unwrap_or("-"),
                        reason = err.error_code(),
                        "Request denied"
                    );
                    Ok(AuthRejection(err).into_response())
                }
            }
        })
    }
}
