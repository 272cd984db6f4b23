use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedPrincipal;
use crate::inbound::http::router::AppState;
use crate::user::models::Role;
use crate::user::models::UserSummary;

/// Returns the authenticated caller's own profile.
pub async fn me(
    State(state): State<AppState>,
    principal: Option<Extension<AuthenticatedPrincipal>>,
) -> Result<ApiSuccess<MeResponseData>, ApiError> {
    let Some(Extension(principal)) = principal else {
        return Err(ApiError::Unauthorized("Not authenticated".to_string()));
    };

    let user = state
        .user_repository
        .find_by_email(&principal.subject)
        .await?
        .ok_or_else(|| ApiError::NotFound("User no longer exists".to_string()))?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        MeResponseData {
            user: UserSummary::from(&user),
            role: principal.role,
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeResponseData {
    pub user: UserSummary,
    pub role: Role,
}
