//! Error types for the Auth API service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bastion_auth_core::AuthError;
use bastion_axum::{AuthRejection, ErrorBody, ErrorDetail};

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(_) => {
                let body = ErrorBody {
                    error: ErrorDetail {
                        code: "BAD_REQUEST",
                        message: self.to_string(),
                    },
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            Self::Auth(err) => AuthRejection(err).into_response(),
        }
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
