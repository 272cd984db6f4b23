use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::AuthResponseData;
use crate::inbound::http::router::AppState;

pub async fn resend_verification(
    State(state): State<AppState>,
    Query(params): Query<ResendVerificationParams>,
) -> Result<ApiSuccess<AuthResponseData>, ApiError> {
    let outcome = state
        .auth_service
        .resend_verification(&params.email)
        .await?;

    Ok(ApiSuccess::new(StatusCode::OK, outcome.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResendVerificationParams {
    pub email: String,
}
