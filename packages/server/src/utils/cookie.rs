use axum_extra::extract::cookie::{Cookie, SameSite};

/// Name of the HTTP-only cookie carrying the refresh token.
pub const REFRESH_COOKIE: &str = "refresh";
/// Optional cookie carrying an access token, for clients that cannot set
/// the `Authorization` header.
pub const ACCESS_COOKIE: &str = "access";

/// Build the refresh cookie: HttpOnly, `Path=/`, `Max-Age` = refresh TTL.
pub fn refresh_cookie(token: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((REFRESH_COOKIE, token))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(time::Duration::seconds(max_age_secs))
        .build()
}

/// A refresh cookie that tells the browser to drop the stored one.
pub fn expired_refresh_cookie(secure: bool) -> Cookie<'static> {
    refresh_cookie(String::new(), 0, secure)
}
