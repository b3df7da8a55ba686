use chrono::{DateTime, Duration, Utc};
use sqlx::FromRow;

/// Lifetime of a password reset token from issuance.
pub const RESET_TOKEN_TTL_SECS: i64 = 60 * 60;

pub fn reset_token_ttl() -> Duration {
    Duration::seconds(RESET_TOKEN_TTL_SECS)
}

#[derive(Debug, Clone, FromRow)]
pub struct PasswordResetToken {
    pub id: String,
    pub admin_id: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl PasswordResetToken {
    pub fn is_consumable(&self, now: DateTime<Utc>) -> bool {
        !self.used && self.expires_at > now
    }
}
