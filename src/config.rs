use std::env;
use std::net::SocketAddr;

use crate::error::AppError;

pub const DEFAULT_BCRYPT_COST: u32 = 10;
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: Option<String>,
    pub environment: Environment,
    pub frontend_url: String,
    pub host: String,
    pub port: u16,
    pub bcrypt_cost: u32,
    pub token_cleanup_interval_secs: u64,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// First-run account created at startup when the admin table is empty.
#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://cms.db".to_string(),
            jwt_secret: None,
            environment: Environment::Development,
            frontend_url: "http://localhost:8080".to_string(),
            host: "0.0.0.0".to_string(),
            port: 4000,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            token_cleanup_interval_secs: 600,
            bootstrap_admin: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let defaults = Config::default();

        let port = match non_empty("SERVER_PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| AppError::Configuration(format!("Invalid SERVER_PORT: {}", raw)))?,
            None => defaults.port,
        };

        let bcrypt_cost = match non_empty("BCRYPT_COST") {
            Some(raw) => parse_bcrypt_cost(&raw)?,
            None => defaults.bcrypt_cost,
        };

        let token_cleanup_interval_secs = match non_empty("TOKEN_CLEANUP_INTERVAL_SECS") {
            Some(raw) => raw.parse().map_err(|_| {
                AppError::Configuration(format!("Invalid TOKEN_CLEANUP_INTERVAL_SECS: {}", raw))
            })?,
            None => defaults.token_cleanup_interval_secs,
        };

        let bootstrap_admin = match (
            non_empty("BOOTSTRAP_ADMIN_USERNAME"),
            non_empty("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(BootstrapAdmin {
                username,
                email: non_empty("BOOTSTRAP_ADMIN_EMAIL"),
                password,
            }),
            _ => None,
        };

        Ok(Self {
            database_url: non_empty("DATABASE_URL").unwrap_or(defaults.database_url),
            jwt_secret: non_empty("JWT_SECRET"),
            environment: non_empty("APP_ENV")
                .map(|raw| Environment::parse(&raw))
                .unwrap_or(defaults.environment),
            frontend_url: non_empty("FRONTEND_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.frontend_url),
            host: non_empty("SERVER_HOST").unwrap_or(defaults.host),
            port,
            bcrypt_cost,
            token_cleanup_interval_secs,
            bootstrap_admin,
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse::<SocketAddr>()
            .map_err(|_| {
                AppError::Configuration(format!("Invalid address {}:{}", self.host, self.port))
            })
    }
}

fn parse_bcrypt_cost(raw: &str) -> Result<u32, AppError> {
    let cost: u32 = raw
        .trim()
        .parse()
        .map_err(|_| AppError::Configuration(format!("Invalid BCRYPT_COST: {}", raw)))?;
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(AppError::Configuration(format!(
            "BCRYPT_COST must be between {} and {}",
            MIN_BCRYPT_COST, MAX_BCRYPT_COST
        )));
    }
    Ok(cost)
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_defaults_to_development() {
        assert_eq!(Environment::parse("production"), Environment::Production);
        assert_eq!(Environment::parse(" PRODUCTION "), Environment::Production);
        assert_eq!(Environment::parse("development"), Environment::Development);
        assert_eq!(Environment::parse("staging"), Environment::Development);
    }

    #[test]
    fn bcrypt_cost_must_be_in_range() {
        assert_eq!(parse_bcrypt_cost("12").unwrap(), 12);
        assert_eq!(parse_bcrypt_cost(" 4 ").unwrap(), MIN_BCRYPT_COST);
        assert!(parse_bcrypt_cost("3").is_err());
        assert!(parse_bcrypt_cost("32").is_err());
        assert!(parse_bcrypt_cost("ten").is_err());
    }

    #[test]
    fn socket_addr_uses_host_and_port() {
        let config = Config::default();
        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.port(), 4000);
    }
}
