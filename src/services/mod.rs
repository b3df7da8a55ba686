pub mod auth;
pub mod blog;
pub mod mailer;
pub mod portfolio;
pub mod session;
