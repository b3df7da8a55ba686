use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{AdminStore, ResetTokenStore, StoreError, UniqueField};
use crate::models::admin::{Admin, AdminChanges, NewAdmin};
use crate::models::reset_token::PasswordResetToken;

const ADMIN_COLUMNS: &str = "id, username, email, password_hash, is_super_admin, created_at";
const TOKEN_COLUMNS: &str = "id, admin_id, token, expires_at, used, created_at";

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Unicode-aware lowercasing; SQLite's `NOCASE` only folds ASCII.
fn fold_username(username: &str) -> String {
    username.to_lowercase()
}

/// Maps a unique index violation onto the field it guards.
fn map_write_error(err: sqlx::Error) -> StoreError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            if message.contains("admins.username") {
                return StoreError::Duplicate(UniqueField::Username);
            }
            if message.contains("admins.email") {
                return StoreError::Duplicate(UniqueField::Email);
            }
            if message.contains("password_reset_tokens.token") {
                return StoreError::Duplicate(UniqueField::Token);
            }
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl AdminStore for SqliteStore {
    async fn find_by_username(
        &self,
        username: &str,
        case_insensitive: bool,
    ) -> Result<Option<Admin>, StoreError> {
        if !case_insensitive {
            let admin = sqlx::query_as::<_, Admin>(&format!(
                "SELECT {} FROM admins WHERE username = ?",
                ADMIN_COLUMNS
            ))
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
            return Ok(admin);
        }

        // Uniqueness is exact-match, so several accounts may fold to the same name.
        let mut matches = sqlx::query_as::<_, Admin>(&format!(
            "SELECT {} FROM admins WHERE username_folded = ? ORDER BY created_at ASC, rowid ASC LIMIT 2",
            ADMIN_COLUMNS
        ))
        .bind(fold_username(username))
        .fetch_all(&self.pool)
        .await?;

        if matches.len() > 1 {
            tracing::warn!(
                "Username '{}' matches several accounts case-insensitively, using the oldest",
                username
            );
        }

        Ok(if matches.is_empty() {
            None
        } else {
            Some(matches.swap_remove(0))
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, StoreError> {
        let admin = sqlx::query_as::<_, Admin>(&format!(
            "SELECT {} FROM admins WHERE email = ?",
            ADMIN_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Admin>, StoreError> {
        let admin = sqlx::query_as::<_, Admin>(&format!(
            "SELECT {} FROM admins WHERE id = ?",
            ADMIN_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    async fn create(&self, admin: NewAdmin) -> Result<Admin, StoreError> {
        let created = Admin {
            id: Uuid::new_v4().to_string(),
            username: admin.username,
            email: admin.email,
            password_hash: admin.password_hash,
            is_super_admin: admin.is_super_admin,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO admins (id, username, username_folded, email, password_hash, is_super_admin, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&created.id)
        .bind(&created.username)
        .bind(fold_username(&created.username))
        .bind(&created.email)
        .bind(&created.password_hash)
        .bind(created.is_super_admin)
        .bind(created.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(created)
    }

    async fn update(&self, id: &str, changes: AdminChanges) -> Result<(), StoreError> {
        let set_email = changes.email.is_some();
        let username_folded = changes.username.as_deref().map(fold_username);
        sqlx::query(
            r#"
            UPDATE admins
            SET username = COALESCE(?, username),
                username_folded = COALESCE(?, username_folded),
                email = CASE WHEN ? THEN ? ELSE email END,
                password_hash = COALESCE(?, password_hash)
            WHERE id = ?
            "#,
        )
        .bind(changes.username)
        .bind(username_folded)
        .bind(set_email)
        .bind(changes.email.flatten())
        .bind(changes.password_hash)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM admins WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<Admin>, StoreError> {
        let admins = sqlx::query_as::<_, Admin>(&format!(
            "SELECT {} FROM admins ORDER BY created_at DESC, rowid DESC",
            ADMIN_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(admins)
    }
}

#[async_trait]
impl ResetTokenStore for SqliteStore {
    async fn delete_unused_for_admin(&self, admin_id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM password_reset_tokens WHERE admin_id = ? AND used = 0")
            .bind(admin_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn create(
        &self,
        admin_id: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<PasswordResetToken, StoreError> {
        let created = PasswordResetToken {
            id: Uuid::new_v4().to_string(),
            admin_id: admin_id.to_string(),
            token: token.to_string(),
            expires_at,
            used: false,
            created_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO password_reset_tokens (id, admin_id, token, expires_at, used, created_at) VALUES (?, ?, ?, ?, 0, ?)",
        )
        .bind(&created.id)
        .bind(&created.admin_id)
        .bind(&created.token)
        .bind(created.expires_at)
        .bind(created.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(created)
    }

    async fn find_valid_by_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<PasswordResetToken>, StoreError> {
        let found = sqlx::query_as::<_, PasswordResetToken>(&format!(
            "SELECT {} FROM password_reset_tokens WHERE token = ? AND used = 0 AND julianday(expires_at) > julianday(?)",
            TOKEN_COLUMNS
        ))
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found)
    }

    async fn mark_used(&self, token_id: &str, now: DateTime<Utc>) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE password_reset_tokens SET used = 1 WHERE id = ? AND used = 0 AND julianday(expires_at) > julianday(?)",
        )
        .bind(token_id)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "DELETE FROM password_reset_tokens WHERE used = 0 AND julianday(expires_at) <= julianday(?)",
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
