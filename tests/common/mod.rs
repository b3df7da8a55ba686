#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use cms_backend::config::{Config, Environment, MIN_BCRYPT_COST};
use cms_backend::models::admin::{Admin, CreateAdminRequest};
use cms_backend::services::mailer::{MailError, Mailer, PasswordResetEmail};
use cms_backend::{db, router, AppState};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub const PASSWORD: &str = "secret123";

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<PasswordResetEmail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_password_reset(&self, email: &PasswordResetEmail) -> Result<(), MailError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}

pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send_password_reset(&self, _email: &PasswordResetEmail) -> Result<(), MailError> {
        Err(MailError::NotConfigured)
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: Some("test-secret".to_string()),
        environment: Environment::Development,
        frontend_url: "http://front.test".to_string(),
        bcrypt_cost: MIN_BCRYPT_COST,
        ..Config::default()
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config(), Arc::new(RecordingMailer::default())).await
}

pub async fn spawn_app_with(config: Config, mailer: Arc<dyn Mailer>) -> TestApp {
    let pool = db::establish_connection(&config.database_url)
        .await
        .expect("Failed to open test database");
    let state = Arc::new(AppState::new(config, pool, mailer).expect("Failed to build app state"));
    TestApp {
        router: router(state.clone()),
        state,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }

    /// Sends `body` verbatim, with the content type left to the caller.
    pub async fn request_raw(
        &self,
        method: Method,
        uri: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let response = self
            .router
            .clone()
            .oneshot(builder.body(Body::from(body.to_string())).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    /// Goes through the first-run path, so the first call yields a super admin.
    pub async fn bootstrap(&self, username: &str, email: Option<&str>) -> Admin {
        self.state
            .auth
            .bootstrap_admin(CreateAdminRequest {
                username: username.to_string(),
                email: email.map(str::to_string),
                password: PASSWORD.to_string(),
            })
            .await
            .expect("bootstrap admin")
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(serde_json::json!({ "username": username, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["sessionToken"].as_str().unwrap().to_string()
    }

    pub async fn password_hash(&self, admin_id: &str) -> String {
        sqlx::query_scalar("SELECT password_hash FROM admins WHERE id = ?")
            .bind(admin_id)
            .fetch_one(&self.state.db)
            .await
            .unwrap()
    }

    pub async fn unused_tokens(&self, admin_id: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM password_reset_tokens WHERE admin_id = ? AND used = 0")
            .bind(admin_id)
            .fetch_one(&self.state.db)
            .await
            .unwrap()
    }

    pub async fn total_tokens(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM password_reset_tokens")
            .fetch_one(&self.state.db)
            .await
            .unwrap()
    }
}

pub fn token_from_url(url: &str) -> String {
    url.split("token=").nth(1).unwrap().to_string()
}
