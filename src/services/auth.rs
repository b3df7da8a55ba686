//! Admin authentication, account management and the password reset flow.

use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::Utc;

use crate::config::{Config, Environment};
use crate::error::AppError;
use crate::models::admin::{
    Admin, AdminChanges, AdminProfile, CreateAdminRequest, ForgotPasswordRequest,
    ForgotPasswordResponse, LoginResponse, NewAdmin, ResetPasswordRequest, UpdateAdminRequest,
};
use crate::models::reset_token::reset_token_ttl;
use crate::services::mailer::{Mailer, PasswordResetEmail};
use crate::services::session::{bearer_token, Principal, SessionKeys};
use crate::store::{AdminStore, ResetTokenStore};
use crate::utils::{
    generate_reset_token, hash_password, is_bcrypt_hash, is_valid_email, verify_password,
    MIN_PASSWORD_LEN,
};

pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If the username or email exists, a password reset email will be sent";

const SUPER_ADMIN_REQUIRED: &str = "Super administrator access required";
const ADMIN_NOT_FOUND: &str = "Admin not found";

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub bcrypt_cost: u32,
    pub frontend_url: String,
    pub environment: Environment,
}

impl From<&Config> for AuthSettings {
    fn from(config: &Config) -> Self {
        Self {
            bcrypt_cost: config.bcrypt_cost,
            frontend_url: config.frontend_url.clone(),
            environment: config.environment,
        }
    }
}

pub struct AuthService {
    admins: Arc<dyn AdminStore>,
    tokens: Arc<dyn ResetTokenStore>,
    mailer: Arc<dyn Mailer>,
    sessions: SessionKeys,
    settings: AuthSettings,
    /// Verified against when the username is unknown so both failures cost the same.
    dummy_hash: String,
}

impl AuthService {
    pub fn new(
        admins: Arc<dyn AdminStore>,
        tokens: Arc<dyn ResetTokenStore>,
        mailer: Arc<dyn Mailer>,
        sessions: SessionKeys,
        settings: AuthSettings,
    ) -> Result<Self, AppError> {
        let dummy_hash = bcrypt::hash(generate_reset_token(), settings.bcrypt_cost)
            .map_err(|e| AppError::internal(format!("bcrypt hash failed: {}", e)))?;

        Ok(Self {
            admins,
            tokens,
            mailer,
            sessions,
            settings,
            dummy_hash,
        })
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AppError> {
        let username = username.trim();
        let password = password.trim();

        if username.is_empty() || password.is_empty() {
            return Err(AppError::validation("Username and password are required"));
        }

        if !self.sessions.is_configured() {
            return Err(AppError::Configuration("JWT_SECRET is not set".to_string()));
        }

        let Some(admin) = self.admins.find_by_username(username, true).await? else {
            let _ = verify_password(password.to_string(), self.dummy_hash.clone()).await;
            return Err(AppError::InvalidCredentials);
        };

        if !is_bcrypt_hash(&admin.password_hash) {
            return Err(AppError::Configuration(format!(
                "stored password for admin {} is not a bcrypt hash",
                admin.id
            )));
        }

        if !verify_password(password.to_string(), admin.password_hash.clone()).await? {
            return Err(AppError::InvalidCredentials);
        }

        let session_token = self.sessions.issue(&admin)?;
        tracing::info!(admin_id = %admin.id, "Admin logged in");

        Ok(LoginResponse {
            session_token,
            username: admin.username,
            is_super_admin: admin.is_super_admin,
        })
    }

    pub fn require_session(&self, token: Option<&str>) -> Result<Principal, AppError> {
        let token = token.ok_or(AppError::MissingToken)?;
        self.sessions.verify(token)
    }

    /// Principal for routes that are public but show more to signed-in admins.
    pub fn optional_principal(&self, headers: &HeaderMap) -> Option<Principal> {
        bearer_token(headers).and_then(|token| self.sessions.verify(token).ok())
    }

    /// Checks the stored flag, not the token claim, so demotions apply immediately.
    pub async fn require_super_admin(&self, principal: &Principal) -> Result<Admin, AppError> {
        match self.admins.find_by_id(&principal.id).await? {
            Some(admin) if admin.is_super_admin => Ok(admin),
            _ => Err(AppError::forbidden(SUPER_ADMIN_REQUIRED)),
        }
    }

    pub async fn me(&self, principal: &Principal) -> Result<AdminProfile, AppError> {
        self.admins
            .find_by_id(&principal.id)
            .await?
            .map(AdminProfile::from)
            .ok_or_else(|| AppError::not_found(ADMIN_NOT_FOUND))
    }

    pub async fn list_admins(&self) -> Result<Vec<AdminProfile>, AppError> {
        let admins = self.admins.list_all().await?;
        Ok(admins.into_iter().map(AdminProfile::from).collect())
    }

    pub async fn create_admin(
        &self,
        requestor: &Principal,
        request: CreateAdminRequest,
    ) -> Result<Admin, AppError> {
        self.require_super_admin(requestor).await?;
        let admin = self.insert_admin(request, false).await?;
        tracing::info!(
            admin_id = %admin.id,
            created_by = %requestor.id,
            "Admin account created"
        );
        Ok(admin)
    }

    /// First-run provisioning: the account is super-admin iff none exists yet.
    pub async fn bootstrap_admin(&self, request: CreateAdminRequest) -> Result<Admin, AppError> {
        let has_super_admin = self
            .admins
            .list_all()
            .await?
            .iter()
            .any(|admin| admin.is_super_admin);

        let admin = self.insert_admin(request, !has_super_admin).await?;
        if admin.is_super_admin {
            tracing::info!(admin_id = %admin.id, "Bootstrapped super administrator '{}'", admin.username);
        } else {
            tracing::info!(admin_id = %admin.id, "Bootstrapped administrator '{}'", admin.username);
        }
        Ok(admin)
    }

    async fn insert_admin(
        &self,
        request: CreateAdminRequest,
        is_super_admin: bool,
    ) -> Result<Admin, AppError> {
        let username = request.username.trim().to_string();
        if username.is_empty() || request.password.is_empty() {
            return Err(AppError::validation("Username and password are required"));
        }
        validate_password(&request.password, "Password must be at least 6 characters")?;
        let email = normalize_email(request.email)?;

        let password_hash = hash_password(request.password, self.settings.bcrypt_cost).await?;
        let admin = self
            .admins
            .create(NewAdmin {
                username,
                email,
                password_hash,
                is_super_admin,
            })
            .await?;
        Ok(admin)
    }

    pub async fn update_admin(
        &self,
        requestor: &Principal,
        target_id: &str,
        request: UpdateAdminRequest,
    ) -> Result<(), AppError> {
        let requestor_is_super = self
            .admins
            .find_by_id(&requestor.id)
            .await?
            .is_some_and(|admin| admin.is_super_admin);

        if !requestor_is_super && requestor.id != target_id {
            return Err(AppError::forbidden("You can only modify your own account"));
        }

        let username = request.username.trim().to_string();
        if username.is_empty() {
            return Err(AppError::validation("Username is required"));
        }
        let email = normalize_email(request.email)?;

        if self.admins.find_by_id(target_id).await?.is_none() {
            return Err(AppError::not_found(ADMIN_NOT_FOUND));
        }

        let password_hash = match request.password.filter(|password| !password.is_empty()) {
            Some(password) => {
                validate_password(&password, "Password must be at least 6 characters")?;
                Some(hash_password(password, self.settings.bcrypt_cost).await?)
            }
            None => None,
        };

        self.admins
            .update(
                target_id,
                AdminChanges {
                    username: Some(username),
                    email: Some(email),
                    password_hash,
                },
            )
            .await?;

        tracing::info!(admin_id = %target_id, updated_by = %requestor.id, "Admin account updated");
        Ok(())
    }

    pub async fn delete_admin(&self, requestor: &Principal, target_id: &str) -> Result<(), AppError> {
        self.require_super_admin(requestor).await?;

        if requestor.id == target_id {
            return Err(AppError::validation("You cannot delete your own account"));
        }

        let target = self
            .admins
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| AppError::not_found(ADMIN_NOT_FOUND))?;

        if target.is_super_admin {
            return Err(AppError::validation("Cannot delete another super administrator"));
        }

        self.admins.delete(target_id).await?;
        tracing::info!(admin_id = %target_id, deleted_by = %requestor.id, "Admin account deleted");
        Ok(())
    }

    /// Unknown accounts get the same answer as known ones.
    pub async fn forgot_password(
        &self,
        request: ForgotPasswordRequest,
    ) -> Result<ForgotPasswordResponse, AppError> {
        let email = non_blank(request.email);
        let username = non_blank(request.username);

        let admin = match (&email, &username) {
            (Some(email), _) => self.admins.find_by_email(email).await?,
            (None, Some(username)) => self.admins.find_by_username(username, false).await?,
            (None, None) => return Err(AppError::validation("Username or email is required")),
        };

        let Some(admin) = admin else {
            return Ok(ForgotPasswordResponse {
                message: FORGOT_PASSWORD_MESSAGE.to_string(),
                reset_url: None,
            });
        };

        let Some(recipient) = admin.email.clone() else {
            return Err(AppError::validation(
                "No email address registered for this account. Please contact an administrator.",
            ));
        };

        self.tokens.delete_unused_for_admin(&admin.id).await?;
        let token = generate_reset_token();
        self.tokens
            .create(&admin.id, &token, Utc::now() + reset_token_ttl())
            .await?;

        let reset_url = format!(
            "{}/admin/reset-password?token={}",
            self.settings.frontend_url, token
        );

        let email = PasswordResetEmail {
            to: recipient,
            username: admin.username.clone(),
            reset_url: reset_url.clone(),
        };
        match self.mailer.send_password_reset(&email).await {
            Ok(()) => tracing::info!(admin_id = %admin.id, "Password reset email sent"),
            Err(e) => tracing::warn!(admin_id = %admin.id, "Password reset email not delivered: {}", e),
        }

        Ok(ForgotPasswordResponse {
            message: FORGOT_PASSWORD_MESSAGE.to_string(),
            reset_url: match self.settings.environment {
                Environment::Production => None,
                Environment::Development => Some(reset_url),
            },
        })
    }

    /// Not found, used and expired tokens are reported identically.
    pub async fn reset_password(&self, request: ResetPasswordRequest) -> Result<(), AppError> {
        let token = request.token.trim();
        if token.is_empty() || request.password.is_empty() {
            return Err(AppError::validation("Token and password are required"));
        }
        validate_password(&request.password, "Password must be at least 6 characters")?;

        let reset = self
            .tokens
            .find_valid_by_token(token, Utc::now())
            .await?
            .ok_or_else(|| AppError::validation("Invalid or expired token"))?;

        let password_hash = hash_password(request.password, self.settings.bcrypt_cost).await?;

        // Claim first; a lost race reports the token as invalid.
        if !self.tokens.mark_used(&reset.id, Utc::now()).await? {
            return Err(AppError::validation("Invalid or expired token"));
        }
        self.admins
            .update(&reset.admin_id, AdminChanges::password(password_hash))
            .await?;

        tracing::info!(admin_id = %reset.admin_id, "Password reset with token");
        Ok(())
    }

    pub async fn admin_resets_other_password(
        &self,
        requestor: &Principal,
        target_id: &str,
        new_password: String,
    ) -> Result<(), AppError> {
        self.require_super_admin(requestor).await?;
        validate_password(&new_password, "New password must be at least 6 characters")?;

        if self.admins.find_by_id(target_id).await?.is_none() {
            return Err(AppError::not_found(ADMIN_NOT_FOUND));
        }

        if requestor.id == target_id {
            return Err(AppError::validation(
                "Use the regular password reset for your own account",
            ));
        }

        let password_hash = hash_password(new_password, self.settings.bcrypt_cost).await?;
        self.admins
            .update(target_id, AdminChanges::password(password_hash))
            .await?;

        tracing::info!(admin_id = %target_id, reset_by = %requestor.id, "Password reset by super administrator");
        Ok(())
    }
}

fn validate_password(password: &str, message: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(message));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Blank means "no email"; anything else must look like an address.
fn normalize_email(email: Option<String>) -> Result<Option<String>, AppError> {
    match non_blank(email) {
        Some(email) if !is_valid_email(&email) => Err(AppError::validation("Invalid email format")),
        other => Ok(other),
    }
}
