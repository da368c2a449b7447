use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::normalize_email;
use crate::repositories::AccountStore;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ActivationRequest {
    pub email: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ActivationResponse {
    pub account_id: Uuid,
    pub activated: bool,
}

/// アカウント有効化ハンドラー
///
/// POST /api/account-activation
///
/// # Security
/// - アカウント不在とトークン不一致は同じ `TokenInvalid` を返す
pub async fn activate_account(
    State(state): State<AppState>,
    Json(request): Json<ActivationRequest>,
) -> Result<Json<ActivationResponse>, AppError> {
    validate_activation_request(&request)?;

    let email = normalize_email(&request.email);
    let mut account = state
        .account_repo
        .find_by_email(&email)
        .await?
        .ok_or(AppError::TokenInvalid)?;

    if !state.credentials.activate(&mut account, &request.token).await? {
        return Err(AppError::TokenInvalid);
    }

    Ok(Json(ActivationResponse {
        account_id: account.id,
        activated: account.activated,
    }))
}

fn validate_activation_request(request: &ActivationRequest) -> Result<(), AppError> {
    if request.email.trim().is_empty() || request.token.trim().is_empty() {
        return Err(AppError::TokenInvalid);
    }
    Ok(())
}
