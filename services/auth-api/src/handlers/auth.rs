//! Login and protected route handlers

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use bastion_axum::Authenticated;
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

/// POST /auth/login
///
/// Exchange a login name and password for a bearer token, returned as plain text.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<String> {
    let Json(req) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let issued = state
        .login
        .login(&req.login, &req.password, chrono::Utc::now())
        .await?;

    Ok(issued.token)
}

fn greeting(route: &str, user: &Authenticated) -> String {
    format!("{route}! User: {}", user.subject)
}

/// POST /auth/protected
pub async fn protected(user: Authenticated) -> String {
    greeting("Protected route", &user)
}

/// POST /auth/adminRole
pub async fn admin_role(user: Authenticated) -> String {
    greeting("Protected ADMIN role route", &user)
}

/// POST /auth/userRole
pub async fn user_role(user: Authenticated) -> String {
    greeting("Protected USER role route", &user)
}

/// POST /auth/authorityRead1
pub async fn authority_read1(user: Authenticated) -> String {
    greeting("Protected AUTHORITY_READ1 route", &user)
}

/// POST /auth/authorityRead2
pub async fn authority_read2(user: Authenticated) -> String {
    greeting("Protected AUTHORITY_READ2 route", &user)
}

/// POST /auth/userOrAdminRole
pub async fn user_or_admin_role(user: Authenticated) -> String {
    greeting("Protected USER or ADMIN role route", &user)
}

/// POST /auth/authorityRead1or2
pub async fn authority_read1_or_2(user: Authenticated) -> String {
    greeting("Protected AUTHORITY_READ1 or AUTHORITY_READ2 route", &user)
}
