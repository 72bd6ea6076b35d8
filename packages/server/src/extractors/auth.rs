use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;
use common::UserRole;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::cookie::ACCESS_COOKIE;
use crate::utils::jwt::TokenCategory;

/// The authenticated caller of a request.
///
/// Read from `Authorization: Bearer <access>`, falling back to the `access`
/// cookie. Only unexpired tokens of category `access` count; anything else
/// leaves the request anonymous. Add this as a handler parameter to require
/// authentication.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: i32,
    pub username: String,
    pub role: UserRole,
}

/// Principal for endpoints that also serve anonymous callers.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl OptionalAuthUser {
    pub fn as_ref(&self) -> Option<&AuthUser> {
        self.0.as_ref()
    }
}

fn access_token(parts: &Parts) -> Option<String> {
    let from_header = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string());

    from_header.or_else(|| {
        CookieJar::from_headers(&parts.headers)
            .get(ACCESS_COOKIE)
            .map(|c| c.value().to_string())
    })
}

/// Resolve the principal of a request, or `None` for anonymous.
pub fn resolve_principal(parts: &Parts, state: &AppState) -> Option<AuthUser> {
    let token = access_token(parts)?;
    let claims = match state.jwt.verify(&token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!("Ignoring access token: {e}");
            return None;
        }
    };
    if claims.category != TokenCategory::Access {
        tracing::debug!("Ignoring token of category {:?}", claims.category);
        return None;
    }

    Some(AuthUser {
        user_id: claims.user_id,
        username: claims.username,
        role: claims.role,
    })
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve_principal(parts, state).ok_or(AppError::Unauthenticated)
    }
}

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuthUser(resolve_principal(parts, state)))
    }
}
