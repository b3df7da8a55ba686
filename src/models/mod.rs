pub mod admin;
pub mod blog;
pub mod portfolio;
pub mod reset_token;
