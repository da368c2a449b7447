use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

// === リセットリクエスト ===

#[derive(Debug, Deserialize)]
pub struct ResetRequestRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct ResetRequestResponse {
    pub message: String,
}

/// POST /api/password/reset-request
///
/// # Security
/// 常に200を返す（アカウント存在有無を漏洩しない）
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(request): Json<ResetRequestRequest>,
) -> Result<Json<ResetRequestResponse>, AppError> {
    validate_email(&request.email)?;

    state
        .password_reset_service()
        .request_reset(&request.email)
        .await?;

    Ok(Json(ResetRequestResponse {
        message: "パスワードリセット手順をメールで送信しました".to_string(),
    }))
}

// === パスワードリセット実行 ===

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub token: String,
    pub new_password: String,
    pub new_password_confirmation: String,
}

#[derive(Debug, Serialize)]
pub struct ResetPasswordResponse {
    pub message: String,
}

/// POST /api/password/reset
///
/// 期限切れ（`TokenExpired`）と不正なリンク（`TokenInvalid`）は区別して返す
///
/// # Security
/// - token, new_password はログに出力しない
pub async fn reset_password(
    State(state): State<AppState>,
    Json(request): Json<ResetPasswordRequest>,
) -> Result<Json<ResetPasswordResponse>, AppError> {
    validate_reset_password_request(&request)?;

    state
        .password_reset_service()
        .reset_password(&request.email, &request.token, &request.new_password)
        .await?;

    Ok(Json(ResetPasswordResponse {
        message: "パスワードが更新されました".to_string(),
    }))
}

/// メールアドレスのバリデーション
fn validate_email(email: &str) -> Result<(), AppError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(AppError::Validation(
            "有効なメールアドレスを入力してください".to_string(),
        ));
    }
    Ok(())
}

/// リセットパスワードリクエストのバリデーション
///
/// パスワード長はトークン検証後にチェックする
fn validate_reset_password_request(request: &ResetPasswordRequest) -> Result<(), AppError> {
    validate_email(&request.email)?;
    if request.token.trim().is_empty() {
        return Err(AppError::Validation("トークンは必須です".to_string()));
    }
    if request.new_password.is_empty() {
        return Err(AppError::Validation("パスワードは必須です".to_string()));
    }
    if request.new_password != request.new_password_confirmation {
        return Err(AppError::Validation(
            "パスワードと確認用パスワードが一致しません".to_string(),
        ));
    }
    Ok(())
}
