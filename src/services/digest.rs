use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;

use crate::error::AppError;

/// トークンの最小バイト数（128ビット）
pub const MIN_TOKEN_BYTES: usize = 16;

/// argon2id のコスト設定
///
/// 検証時のパラメータはダイジェスト（PHC文字列）から読み取るため、
/// コストを変更しても既存のダイジェストは検証できる。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashCost {
    pub memory_kib: u32,
    pub iterations: u32,
}

impl HashCost {
    /// 最小コスト（テスト環境専用）
    pub const MIN: Self = Self {
        memory_kib: Params::MIN_M_COST,
        iterations: Params::MIN_T_COST,
    };

    fn hasher(&self) -> Result<Argon2<'static>, AppError> {
        let params = Params::new(self.memory_kib, self.iterations, 1, None).map_err(|e| {
            tracing::error!(error = ?e, "argon2 パラメータが不正");
            AppError::Internal(anyhow::anyhow!("invalid argon2 params"))
        })?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl Default for HashCost {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
        }
    }
}

/// シークレット（パスワード・トークン）を argon2id でハッシュ化
///
/// ソルトはランダムなので同じ入力でも毎回異なるダイジェストになる
pub fn hash(secret: &str, cost: &HashCost) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = cost
        .hasher()?
        .hash_password(secret.as_bytes(), &salt)
        .map_err(|e| {
            tracing::error!(error = ?e, "ダイジェスト生成エラー");
            AppError::Internal(anyhow::anyhow!("password hash error"))
        })?;
    Ok(digest.to_string())
}

/// シークレットがダイジェストと一致するか検証
///
/// ダイジェストが無い・壊れている場合はエラーにせず false を返す
pub fn verify(secret: &str, digest: Option<&str>) -> bool {
    let Some(digest) = digest else {
        return false;
    };

    match PasswordHash::new(digest) {
        Ok(parsed) => Argon2::default()
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = ?e, "ダイジェストのパースに失敗");
            false
        }
    }
}

/// URLセーフなランダムトークンを生成
pub fn generate_token(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes.max(MIN_TOKEN_BYTES)];
    rand::thread_rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}
