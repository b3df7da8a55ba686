use std::sync::OnceLock;

use regex::Regex;

use crate::error::AppError;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Size of a reset token before hex encoding.
pub const RESET_TOKEN_BYTES: usize = 32;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap())
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

pub fn is_bcrypt_hash(hash: &str) -> bool {
    hash.starts_with("$2")
}

/// bcrypt is CPU bound, keep it off the async workers.
pub async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AppError::internal(format!("hashing task failed: {}", e)))?
        .map_err(|e| AppError::internal(format!("bcrypt hash failed: {}", e)))
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(|e| AppError::internal(format!("verify task failed: {}", e)))?
        .map_err(|e| AppError::internal(format!("bcrypt verify failed: {}", e)))
}

pub fn generate_reset_token() -> String {
    let bytes: [u8; RESET_TOKEN_BYTES] = rand::random();
    hex::encode(bytes)
}
