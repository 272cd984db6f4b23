use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use axum_extra::extract::cookie::Cookie;
use axum_extra::extract::cookie::SameSite;
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::AuthResponseData;
use crate::inbound::http::router::AppState;
use crate::user::models::LoginCommand;

/// Session cookie name, also read back by the identity middleware.
pub const TOKEN_COOKIE: &str = "token";

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequestBody>,
) -> Result<(CookieJar, ApiSuccess<AuthResponseData>), ApiError> {
    let outcome = state
        .auth_service
        .login(LoginCommand {
            identifier: body.identifier,
            password: body.password,
        })
        .await?;

    // The token travels both in the body (for Authorization-header clients)
    // and as an HttpOnly session cookie (for browsers).
    let jar = match outcome.token.clone() {
        Some(token) => jar.add(
            Cookie::build((TOKEN_COOKIE, token))
                .path("/")
                .http_only(true)
                .secure(state.cookie_secure)
                .same_site(SameSite::Lax)
                .build(),
        ),
        None => jar,
    };

    Ok((jar, ApiSuccess::new(StatusCode::OK, outcome.into())))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    /// Username or email address.
    pub identifier: String,
    pub password: String,
}
