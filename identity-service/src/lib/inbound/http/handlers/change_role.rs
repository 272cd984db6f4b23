use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;
use crate::user::models::Role;
use crate::user::models::RoleChange;
use crate::user::models::UserId;
use crate::user::models::UserSummary;

/// Admin-only. Authorization is enforced by the router layer in front of
/// this handler.
pub async fn change_role(
    State(state): State<AppState>,
    Json(body): Json<ChangeRoleRequestBody>,
) -> Result<ApiSuccess<UserSummary>, ApiError> {
    let role: Role = body
        .role
        .parse()
        .map_err(|_| ApiError::BadRequest(format!("Unknown role: {}", body.role)))?;

    let user = state
        .account_service
        .change_role(RoleChange {
            user_id: body.user_id.map(UserId),
            email: body.email,
            role,
        })
        .await?;

    Ok(ApiSuccess::new(StatusCode::OK, UserSummary::from(&user)))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangeRoleRequestBody {
    #[serde(rename = "userId")]
    pub user_id: Option<i64>,
    pub email: Option<String>,
    pub role: String,
}
