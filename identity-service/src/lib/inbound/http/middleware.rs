use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;

use crate::inbound::http::handlers::login::TOKEN_COOKIE;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::router::AppState;
use crate::user::models::Role;

/// Identity established for the current request, stored in request
/// extensions. Absence means the request is anonymous.
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal {
    /// Email address the token was issued for.
    pub subject: String,
    pub role: Role,
}

/// Resolves a bearer token into an [`AuthenticatedPrincipal`].
///
/// The token is taken from the `Authorization: Bearer` header, falling back
/// to the session cookie. Anonymous and invalid-token requests pass through
/// without a principal; rejecting them is the job of the guards behind this
/// layer, so public endpoints stay reachable.
pub async fn resolve_identity(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    // An upstream layer may have already established identity.
    if req.extensions().get::<AuthenticatedPrincipal>().is_some() {
        return next.run(req).await;
    }

    let Some(token) = extract_token(&req) else {
        return next.run(req).await;
    };

    if state.token_service.is_expired(&token) {
        tracing::debug!("Discarding invalid or expired bearer token");
        return next.run(req).await;
    }

    let subject = match state.token_service.extract_subject(&token) {
        Ok(subject) => subject,
        Err(e) => {
            tracing::debug!(error = %e, "Discarding token without usable subject");
            return next.run(req).await;
        }
    };

    let role = resolve_role(&state, &token, &subject).await;

    req.extensions_mut()
        .insert(AuthenticatedPrincipal { subject, role });

    next.run(req).await
}

/// Prefer the role claim embedded at issuance; tokens minted before the
/// claim existed fall back to a store lookup. A lookup miss or store error
/// degrades to the least privileged role rather than failing the request.
async fn resolve_role(state: &AppState, token: &str, subject: &str) -> Role {
    if let Ok(Some(role)) = state.token_service.extract_role(token) {
        if let Ok(role) = role.parse() {
            return role;
        }
        tracing::warn!(role = %role, "Unrecognized role claim in token");
    }

    match state.user_repository.find_by_email(subject).await {
        Ok(Some(user)) => user.role,
        Ok(None) => Role::User,
        Err(e) => {
            tracing::warn!(error = %e, "Role lookup failed, defaulting to USER");
            Role::User
        }
    }
}

/// Rejects requests that did not resolve to an admin principal. Placed as a
/// route layer on the admin subtree, behind [`resolve_identity`].
pub async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    match req.extensions().get::<AuthenticatedPrincipal>() {
        None => Err(ApiError::Unauthorized("Not authenticated".to_string())),
        Some(principal) if principal.role != Role::Admin => {
            Err(ApiError::Forbidden("Admin role required".to_string()))
        }
        Some(_) => Ok(next.run(req).await),
    }
}

fn extract_token(req: &Request) -> Option<String> {
    if let Some(header) = req.headers().get(http::header::AUTHORIZATION) {
        if let Ok(value) = header.to_str() {
            if let Some(token) = value.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    CookieJar::from_headers(req.headers())
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
}
