use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::storage::StorageError;
use sea_orm::{DbErr, SqlErr};
use serde::Serialize;

use crate::utils::jwt::TokenError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `BAD_REQUEST`, `UNAUTHENTICATED`,
    /// `FORBIDDEN`, `NOT_FOUND`, `CONFLICT`, `TOKEN_MISSING`, `TOKEN_EXPIRED`,
    /// `TOKEN_WRONG_CATEGORY`, `TOKEN_UNKNOWN`, `INTERNAL_ERROR`.
    #[schema(example = "CONFLICT")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Article is not on sale")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    Unauthenticated,
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    /// Refresh was attempted without a refresh token.
    TokenMissing,
    TokenExpired,
    TokenWrongCategory,
    /// The refresh token is well-formed but has no live record (already
    /// rotated, revoked, or forged with a leaked key).
    TokenUnknown,
    Internal(String),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "BAD_REQUEST",
            AppError::Unauthenticated => "UNAUTHENTICATED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::TokenMissing => "TOKEN_MISSING",
            AppError::TokenExpired => "TOKEN_EXPIRED",
            AppError::TokenWrongCategory => "TOKEN_WRONG_CATEGORY",
            AppError::TokenUnknown => "TOKEN_UNKNOWN",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        let code = self.code();
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, ErrorBody { code, message: msg }),
            AppError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                ErrorBody {
                    code,
                    message: "Authentication required".into(),
                },
            ),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, ErrorBody { code, message: msg }),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorBody { code, message: msg }),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorBody { code, message: msg }),
            AppError::TokenMissing => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code,
                    message: "Refresh token is missing".into(),
                },
            ),
            AppError::TokenExpired => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code,
                    message: "Refresh token has expired".into(),
                },
            ),
            AppError::TokenWrongCategory => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code,
                    message: "Token is not a refresh token".into(),
                },
            ),
            AppError::TokenUnknown => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code,
                    message: "Refresh token is not recognized".into(),
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code,
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::Validation(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Internal(msg) => write!(f, "{}: {}", self.code(), msg),
            _ => f.write_str(self.code()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::SizeLimitExceeded { .. } | StorageError::InvalidKey(_) => {
                AppError::Validation(err.to_string())
            }
            StorageError::NotFound(key) => AppError::NotFound(format!("Object '{key}' not found")),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AppError::TokenExpired,
            TokenError::Invalid(_) => AppError::Unauthenticated,
            TokenError::Signing(e) => AppError::Internal(format!("JWT sign error: {e}")),
        }
    }
}

/// Map a unique-constraint violation to `Conflict(msg)`, anything else to
/// `Internal`.
pub fn conflict_on_unique(err: DbErr, msg: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            tracing::debug!("Unique constraint caught: {msg}");
            AppError::Conflict(msg.to_string())
        }
        _ => AppError::from(err),
    }
}
