use alchemy_core::ValidationError;
use alchemy_types::{ErrorResponse, UnknownGameMode};
use serde::Serialize;
use warp::http::StatusCode;

use crate::auth::AuthError;

/// Everything a handler can fail with, already mapped to a status code.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Validation(String),
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    pub fn not_found(what: impl Into<String>) -> Self {
        ApiError::NotFound(format!("{} not found", what.into()))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_reply(&self) -> warp::reply::WithStatus<warp::reply::Json> {
        if let ApiError::Internal(cause) = self {
            tracing::error!("Request failed: {:#}", cause);
        }
        warp::reply::with_status(
            warp::reply::json(&ErrorResponse::new(self.to_string())),
            self.status(),
        )
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        ApiError::Internal(error)
    }
}

impl From<ValidationError> for ApiError {
    fn from(error: ValidationError) -> Self {
        ApiError::Validation(error.to_string())
    }
}

impl From<UnknownGameMode> for ApiError {
    fn from(error: UnknownGameMode) -> Self {
        ApiError::Validation(error.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        ApiError::Unauthorized(error.to_string())
    }
}

/// Turns a handler result into the JSON reply, `{error}` on failure.
pub fn reply<T: Serialize>(
    result: Result<T, ApiError>,
    success: StatusCode,
) -> warp::reply::WithStatus<warp::reply::Json> {
    match result {
        Ok(body) => warp::reply::with_status(warp::reply::json(&body), success),
        Err(error) => error.to_reply(),
    }
}
