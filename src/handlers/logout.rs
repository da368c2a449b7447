use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// ログアウトリクエスト
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub account_id: Uuid,
    /// 破棄する remember トークン
    pub remember_token: String,
}

/// ログアウトレスポンス
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

/// ログアウトハンドラー
///
/// POST /api/logout
///
/// 処理フロー:
/// 1. リクエストバリデーション
/// 2. remember トークンでアカウントを特定
/// 3. remember ダイジェストを破棄
pub async fn logout(
    State(state): State<AppState>,
    Json(request): Json<LogoutRequest>,
) -> Result<Json<LogoutResponse>, AppError> {
    // 1. リクエストバリデーション
    validate_logout_request(&request)?;

    // 2. remember トークン検証
    let mut account = state
        .auth_service()
        .login_with_remember(request.account_id, &request.remember_token)
        .await?;

    // 3. remember ダイジェスト破棄
    state.credentials.forget(&mut account).await?;

    tracing::info!(account_id = %account.id, "ログアウト完了");

    Ok(Json(LogoutResponse {
        message: "ログアウトしました".to_string(),
    }))
}

/// ログアウトリクエストのバリデーション
fn validate_logout_request(request: &LogoutRequest) -> Result<(), AppError> {
    if request.remember_token.trim().is_empty() {
        return Err(AppError::Validation(
            "remember_token は必須です".to_string(),
        ));
    }

    Ok(())
}
