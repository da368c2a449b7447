use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::repositories::RepositoryError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("認証エラー: {0}")]
    Authentication(String),

    #[error("バリデーションエラー: {0}")]
    Validation(String),

    #[error("永続化エラー")]
    Persistence(#[from] RepositoryError),

    #[error("内部エラー")]
    Internal(#[from] anyhow::Error),

    #[error("このメールアドレスは既に使用されています")]
    EmailAlreadyExists,

    #[error("アカウントが有効化されていません")]
    AccountNotActivated,

    #[error("リンクの有効期限が切れています")]
    TokenExpired,

    #[error("無効なリンクです")]
    TokenInvalid,
}

impl From<garde::Report> for AppError {
    fn from(report: garde::Report) -> Self {
        Self::Validation(report.to_string())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // アカウントの存在有無を漏らさない
            Self::Authentication(_) => (
                StatusCode::UNAUTHORIZED,
                "メールアドレスまたはパスワードが正しくありません".to_string(),
            ),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::Persistence(e) => {
                tracing::error!(error = ?e, "永続化エラー");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "内部エラーが発生しました".to_string(),
                )
            }
            Self::Internal(e) => {
                tracing::error!(error = ?e, "内部エラー");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "内部エラーが発生しました".to_string(),
                )
            }
            Self::EmailAlreadyExists => (
                StatusCode::CONFLICT,
                "このメールアドレスは既に使用されています".to_string(),
            ),
            Self::AccountNotActivated => (
                StatusCode::FORBIDDEN,
                "アカウントが有効化されていません。メールの有効化リンクを確認してください"
                    .to_string(),
            ),
            Self::TokenExpired => (
                StatusCode::BAD_REQUEST,
                "リンクの有効期限が切れています。もう一度リセットを申請してください".to_string(),
            ),
            Self::TokenInvalid => (StatusCode::BAD_REQUEST, "無効なリンクです".to_string()),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
