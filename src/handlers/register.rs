use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::NewAccount;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String, // SecretBox不要（Deserialize後すぐハッシュ化）
    pub password_confirmation: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub activated: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub message: String,
}

/// アカウント登録ハンドラー
///
/// POST /api/accounts
///
/// # Security
/// - パスワードはログに出力しない
/// - 有効化トークンはレスポンスに含めない（メールでのみ通知）
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    validate_register_request(&request)?;

    let input = NewAccount {
        name: request.name,
        email: request.email,
        password: request.password,
    };
    let account = state.registration_service().register(&input).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: account.id,
            name: account.name,
            email: account.email,
            activated: account.activated,
            created_at: account.created_at,
            message: "有効化メールを送信しました。メールを確認してください".to_string(),
        }),
    ))
}

/// 登録リクエストのバリデーション
///
/// 項目ごとの形式チェックは登録サービス側で行う
fn validate_register_request(request: &RegisterRequest) -> Result<(), AppError> {
    if request.password != request.password_confirmation {
        return Err(AppError::Validation(
            "パスワードと確認用パスワードが一致しません".to_string(),
        ));
    }
    Ok(())
}
