use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;

/// ログインリクエスト
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// ユーザーのメールアドレス
    pub email: String,
    /// ユーザーのパスワード
    pub password: String,
    /// ログイン状態を保持するか
    #[serde(default)]
    pub remember_me: bool,
}

/// ログインレスポンス
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub account_id: Uuid,
    /// 永続 Cookie に格納する remember トークン（remember_me 指定時のみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remember_token: Option<String>,
}

/// ログインハンドラー
///
/// POST /api/login
///
/// 処理フロー:
/// 1. リクエストバリデーション
/// 2. アカウント認証（パスワード照合・有効化チェック）
/// 3. remember_me 指定時は remember トークン発行、未指定なら既存の remember を破棄
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    // 1. リクエストバリデーション
    validate_login_request(&request)?;

    // 2. アカウント認証
    let mut account = state
        .auth_service()
        .login(&request.email, &request.password)
        .await?;

    // 3. remember トークン
    let remember_token = if request.remember_me {
        Some(state.credentials.issue_remember_token(&mut account).await?)
    } else {
        if account.remember_digest.is_some() {
            state.credentials.forget(&mut account).await?;
        }
        None
    };

    Ok(Json(LoginResponse {
        account_id: account.id,
        remember_token,
    }))
}

/// remember ログインリクエスト
#[derive(Debug, Deserialize)]
pub struct RememberLoginRequest {
    pub account_id: Uuid,
    pub remember_token: String,
}

/// remember トークンによるログインハンドラー
///
/// POST /api/login/remember
pub async fn login_with_remember(
    State(state): State<AppState>,
    Json(request): Json<RememberLoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if request.remember_token.trim().is_empty() {
        return Err(AppError::Validation(
            "remember_token は必須です".to_string(),
        ));
    }

    let account = state
        .auth_service()
        .login_with_remember(request.account_id, &request.remember_token)
        .await?;

    Ok(Json(LoginResponse {
        account_id: account.id,
        remember_token: None,
    }))
}

/// ログインリクエストのバリデーション
fn validate_login_request(request: &LoginRequest) -> Result<(), AppError> {
    // email: 必須
    if request.email.trim().is_empty() {
        return Err(AppError::Validation("メールアドレスは必須です".to_string()));
    }

    // 簡易的なメール形式チェック（@ が含まれているか）
    if !request.email.contains('@') {
        return Err(AppError::Validation(
            "有効なメールアドレスを入力してください".to_string(),
        ));
    }

    // password: 必須（長さは照合結果に任せる）
    if request.password.is_empty() {
        return Err(AppError::Validation("パスワードは必須です".to_string()));
    }

    Ok(())
}
