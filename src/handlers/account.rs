use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Account, AccountUpdate};
use crate::state::AppState;

/// プロフィール更新リクエスト
#[derive(Debug, Deserialize)]
pub struct UpdateAccountRequest {
    /// 本人確認用の remember トークン
    pub remember_token: String,
    pub name: String,
    pub email: String,
    /// 空文字・未指定ならパスワードは変更しない
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub password_confirmation: Option<String>,
}

/// プロフィール更新ハンドラー
///
/// PATCH /api/accounts/{id}
///
/// 処理フロー:
/// 1. リクエストバリデーション
/// 2. remember トークンで本人確認
/// 3. 名前・メールアドレス・（指定時のみ）パスワードを更新
pub async fn update_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<Json<Account>, AppError> {
    // 1. リクエストバリデーション
    let password = validate_update_request(&request)?;

    // 2. 本人確認
    let mut account = state
        .auth_service()
        .login_with_remember(id, &request.remember_token)
        .await?;

    // 3. 更新
    let input = AccountUpdate {
        name: request.name,
        email: request.email,
        password,
    };
    state
        .account_service()
        .update_account(&mut account, &input)
        .await?;

    Ok(Json(account))
}

/// 更新リクエストのバリデーション
///
/// 変更するパスワードを返す（空欄なら None）
fn validate_update_request(request: &UpdateAccountRequest) -> Result<Option<String>, AppError> {
    if request.remember_token.trim().is_empty() {
        return Err(AppError::Validation(
            "remember_token は必須です".to_string(),
        ));
    }

    let password = request.password.as_deref().unwrap_or_default();
    let confirmation = request.password_confirmation.as_deref().unwrap_or_default();
    if password != confirmation {
        return Err(AppError::Validation(
            "パスワードと確認用パスワードが一致しません".to_string(),
        ));
    }

    Ok((!password.is_empty()).then(|| password.to_string()))
}
