use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::IntoResponse;
use axum_extra::extract::cookie::CookieJar;
use sha2::{Digest, Sha256};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::models::auth::{HandshakeRequest, SessionResponse, validate_handshake_request};
use crate::session::{IdentityProfile, SessionService, TokenPair, find_or_create_user};
use crate::state::AppState;
use crate::utils::cookie::{REFRESH_COOKIE, expired_refresh_cookie, refresh_cookie};

/// Header carrying the identity gateway's shared secret.
pub const IDENTITY_SECRET_HEADER: &str = "x-identity-secret";

fn identity_secret_matches(headers: &HeaderMap, expected: &str) -> bool {
    let Some(presented) = headers
        .get(IDENTITY_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
    else {
        return false;
    };
    // Fixed-length digests keep the secret's length out of the timing.
    Sha256::digest(presented.as_bytes()) == Sha256::digest(expected.as_bytes())
}

/// Attach a token pair to a response: access token in `Authorization`,
/// refresh token in the `refresh` cookie.
fn session_parts(
    state: &AppState,
    jar: CookieJar,
    pair: TokenPair,
) -> Result<(CookieJar, [(header::HeaderName, HeaderValue); 1]), AppError> {
    let bearer = HeaderValue::from_str(&format!("Bearer {}", pair.access.token))
        .map_err(|e| AppError::Internal(format!("Unencodable access token: {e}")))?;
    let jar = jar.add(refresh_cookie(
        pair.refresh.token,
        state.jwt.refresh_ttl().num_seconds(),
        state.config.auth.secure_cookie,
    ));
    Ok((jar, [(header::AUTHORIZATION, bearer)]))
}

#[utoipa::path(
    post,
    path = "/auth/handshake",
    tag = "Auth",
    operation_id = "handshake",
    summary = "Sign in with an externally verified identity",
    description = "Called by the trusted identity gateway after the user authenticated with an \
        external provider. The user is looked up by `(provider, providerId)` and created on first \
        sight. The access token is returned in the `Authorization` header and the refresh token \
        in the HTTP-only `refresh` cookie.",
    params(("x-identity-secret" = String, Header, description = "Identity gateway secret")),
    request_body = HandshakeRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse,
            headers(("Authorization" = String, description = "Bearer access token"))),
        (status = 400, description = "Validation error (BAD_REQUEST)", body = ErrorBody),
        (status = 401, description = "Wrong or missing gateway secret (UNAUTHENTICATED)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, headers, jar, payload), fields(provider = %payload.provider))]
pub async fn handshake(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    AppJson(payload): AppJson<HandshakeRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !identity_secret_matches(&headers, &state.config.auth.identity_secret) {
        return Err(AppError::Unauthenticated);
    }
    validate_handshake_request(&payload)?;

    let profile = IdentityProfile::from(payload);
    let (user, created) = find_or_create_user(&state.db, &profile).await?;
    let pair = SessionService::new(&state.db, &state.jwt)
        .issue_pair(&user)
        .await?;

    let (jar, headers) = session_parts(&state, jar, pair)?;
    Ok((
        jar,
        headers,
        Json(SessionResponse {
            user_id: user.id,
            username: user.username,
            role: user.role,
            new_user: created,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/refreshToken",
    tag = "Auth",
    operation_id = "refreshToken",
    summary = "Rotate the refresh token",
    description = "Consumes the refresh token from the `refresh` cookie and issues a new pair. \
        Each refresh token can be used once; presenting a consumed one fails with `TOKEN_UNKNOWN`.",
    responses(
        (status = 200, description = "Rotated", body = SessionResponse,
            headers(("Authorization" = String, description = "Bearer access token"))),
        (status = 400, description = "TOKEN_MISSING, TOKEN_EXPIRED, TOKEN_WRONG_CATEGORY or TOKEN_UNKNOWN", body = ErrorBody),
    ),
)]
#[instrument(skip(state, jar))]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    let presented = jar.get(REFRESH_COOKIE).map(|c| c.value().to_string());
    let (user, pair) = SessionService::new(&state.db, &state.jwt)
        .rotate(presented.as_deref())
        .await?;

    let (jar, headers) = session_parts(&state, jar, pair)?;
    Ok((
        jar,
        headers,
        Json(SessionResponse {
            user_id: user.id,
            username: user.username,
            role: user.role,
            new_user: false,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/logout",
    tag = "Auth",
    operation_id = "logout",
    summary = "Sign out",
    description = "Revokes the refresh token from the `refresh` cookie, if any, and expires the cookie. \
        Always succeeds.",
    responses((status = 200, description = "Signed out")),
)]
#[instrument(skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    if let Some(cookie) = jar.get(REFRESH_COOKIE) {
        SessionService::new(&state.db, &state.jwt)
            .revoke(cookie.value())
            .await?;
    }
    Ok(jar.add(expired_refresh_cookie(state.config.auth.secure_cookie)))
}
