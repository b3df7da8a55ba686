//! Signed session tokens (HS256 JWT) and the principal they carry.

use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::admin::Admin;

pub const SESSION_TTL_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // admin id
    pub username: String,
    pub is_super_admin: bool,
    pub iat: usize,
    pub exp: usize,
}

/// Identity attached to a request once its session token checks out.
/// `is_super_admin` is the claim at issuance; guards re-read the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: String,
    pub username: String,
    pub is_super_admin: bool,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            is_super_admin: claims.is_super_admin,
        }
    }
}

#[derive(Clone)]
pub struct SessionKeys {
    keys: Option<(EncodingKey, DecodingKey)>,
}

impl SessionKeys {
    pub fn new(secret: Option<&str>) -> Self {
        let keys = secret.map(|secret| {
            (
                EncodingKey::from_secret(secret.as_bytes()),
                DecodingKey::from_secret(secret.as_bytes()),
            )
        });
        Self { keys }
    }

    pub fn is_configured(&self) -> bool {
        self.keys.is_some()
    }

    fn keys(&self) -> Result<&(EncodingKey, DecodingKey), AppError> {
        self.keys
            .as_ref()
            .ok_or_else(|| AppError::Configuration("JWT_SECRET is not set".to_string()))
    }

    pub fn issue(&self, admin: &Admin) -> Result<String, AppError> {
        let (encoding, _) = self.keys()?;
        let now = Utc::now();
        let expiration = now + Duration::days(SESSION_TTL_DAYS);

        let claims = Claims {
            sub: admin.id.clone(),
            username: admin.username.clone(),
            is_super_admin: admin.is_super_admin,
            iat: now.timestamp() as usize,
            exp: expiration.timestamp() as usize,
        };

        encode(&Header::default(), &claims, encoding)
            .map_err(|e| AppError::internal(format!("Failed to sign session token: {}", e)))
    }

    /// Bad signature, malformed token and expiry all collapse into `InvalidToken`.
    pub fn verify(&self, token: &str) -> Result<Principal, AppError> {
        let (_, decoding) = self.keys()?;
        decode::<Claims>(token, decoding, &Validation::default())
            .map(|data| data.claims.into())
            .map_err(|e| {
                tracing::debug!("Rejected session token: {}", e);
                AppError::InvalidToken
            })
    }
}

/// Extracts `<token>` from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
