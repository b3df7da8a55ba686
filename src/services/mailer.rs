//! Outbound mail seam. Delivery is owned by an external provider; the auth
//! flow only needs best-effort sending of reset links.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("mail delivery is not configured")]
    NotConfigured,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetEmail {
    pub to: String,
    pub username: String,
    pub reset_url: String,
}

impl PasswordResetEmail {
    pub fn subject(&self) -> &'static str {
        "Password reset - Admin"
    }

    pub fn text_body(&self) -> String {
        format!(
            "Hello {},\n\n\
             A password reset was requested for your administrator account.\n\n\
             Open this link to choose a new password (valid for 1 hour):\n{}\n\n\
             If you did not request this, you can ignore this email.\n",
            self.username, self.reset_url
        )
    }
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_password_reset(&self, email: &PasswordResetEmail) -> Result<(), MailError>;
}

/// Used when no mail provider is wired in; every send reports `NotConfigured`.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send_password_reset(&self, email: &PasswordResetEmail) -> Result<(), MailError> {
        tracing::debug!(
            to = %email.to,
            subject = email.subject(),
            "Mail delivery disabled, password reset email not sent:\n{}",
            email.text_body()
        );
        Err(MailError::NotConfigured)
    }
}
