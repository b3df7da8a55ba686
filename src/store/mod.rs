//! Persistence contracts for admin accounts and password reset tokens.
//!
//! The auth service only talks to these traits; [`sqlite::SqliteStore`] is the
//! relational implementation used by the server and the test suite.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::admin::{Admin, AdminChanges, NewAdmin};
use crate::models::reset_token::PasswordResetToken;

pub mod sqlite;

pub use sqlite::SqliteStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
    Token,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::Username => write!(f, "username"),
            UniqueField::Email => write!(f, "email"),
            UniqueField::Token => write!(f, "token"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate {0}")]
    Duplicate(UniqueField),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait AdminStore: Send + Sync {
    async fn find_by_username(
        &self,
        username: &str,
        case_insensitive: bool,
    ) -> Result<Option<Admin>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Admin>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Admin>, StoreError>;

    /// Fails with [`StoreError::Duplicate`] when the username or email is taken.
    async fn create(&self, admin: NewAdmin) -> Result<Admin, StoreError>;

    /// Fails with [`StoreError::Duplicate`] when the new username or email
    /// belongs to another admin.
    async fn update(&self, id: &str, changes: AdminChanges) -> Result<(), StoreError>;

    /// Removes the admin and, by cascade, its reset tokens.
    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    /// Newest first.
    async fn list_all(&self) -> Result<Vec<Admin>, StoreError>;
}

#[async_trait]
pub trait ResetTokenStore: Send + Sync {
    async fn delete_unused_for_admin(&self, admin_id: &str) -> Result<(), StoreError>;

    async fn create(
        &self,
        admin_id: &str,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<PasswordResetToken, StoreError>;

    /// Only returns a token that is unused and expires strictly after `now`.
    async fn find_valid_by_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<PasswordResetToken>, StoreError>;

    /// Flips the token to used if it is still unused and unexpired at `now`.
    /// Returns `false` when another caller got there first or it has expired.
    async fn mark_used(&self, token_id: &str, now: DateTime<Utc>) -> Result<bool, StoreError>;

    /// Deletes expired tokens that were never used. Returns the number removed.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}
