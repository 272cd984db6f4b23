use axum::http::StatusCode;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::CookieJar;

use super::login::TOKEN_COOKIE;
use super::ApiSuccess;
use super::AuthResponseData;
use crate::user::models::AuthOutcome;

/// Ends the cookie-based session by expiring the `token` cookie. The
/// removal cookie must carry the same path as the one set at login.
/// Stateless access tokens held by header clients stay valid until their
/// own expiry.
pub async fn logout(jar: CookieJar) -> (CookieJar, ApiSuccess<AuthResponseData>) {
    let jar = jar.remove(Cookie::build((TOKEN_COOKIE, "")).path("/").build());

    (
        jar,
        ApiSuccess::new(
            StatusCode::OK,
            AuthOutcome::message_only("Logged out successfully").into(),
        ),
    )
}
