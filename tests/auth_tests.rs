mod common;

use axum::http::{Method, StatusCode};
use common::{spawn_app, spawn_app_with, test_config, RecordingMailer, PASSWORD};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn health_check_responds_ok() {
    let app = spawn_app().await;
    let (status, body) = app.request(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn login_is_case_insensitive_on_username() {
    let app = spawn_app().await;
    app.bootstrap("Alice", Some("alice@club.fr")).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "aLiCe", "password": PASSWORD })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "Alice");
    assert_eq!(body["isSuperAdmin"], true);
    assert!(body["sessionToken"].as_str().unwrap().len() > 20);
}

#[tokio::test]
async fn login_folds_non_ascii_usernames() {
    let app = spawn_app().await;
    app.bootstrap("Éric", None).await;

    for variant in ["éric", "ÉRIC", "Éric"] {
        let (status, body) = app
            .request(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "username": variant, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}: {}", variant, body);
        assert_eq!(body["username"], "Éric");
    }
}

#[tokio::test]
async fn unknown_user_and_wrong_password_look_the_same() {
    let app = spawn_app().await;
    app.bootstrap("alice", None).await;

    let unknown = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "nobody", "password": PASSWORD })),
        )
        .await;
    let wrong = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "not-it" })),
        )
        .await;

    assert_eq!(unknown.0, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown, wrong);
}

#[tokio::test]
async fn login_requires_both_fields() {
    let app = spawn_app().await;
    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "  ", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username and password are required");
}

#[tokio::test]
async fn unreadable_bodies_are_json_validation_errors() {
    let app = spawn_app().await;
    let json = Some("application/json");

    let cases = [
        (json, r#"{"username": 5, "password": "secret123"}"#, "Invalid request body"),
        (json, r#"{"username": "alice""#, "Malformed JSON body"),
        (None, r#"{"username": "alice", "password": "secret123"}"#, "Content-Type must be application/json"),
        (Some("text/plain"), "username=alice", "Content-Type must be application/json"),
    ];

    for (content_type, body, expected) in cases {
        let (status, response) = app
            .request_raw(Method::POST, "/api/auth/login", content_type, body)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
        assert_eq!(response["error"], expected);
    }
}

#[tokio::test]
async fn login_without_signing_secret_is_a_server_error() {
    let config = cms_backend::config::Config {
        jwt_secret: None,
        ..test_config()
    };
    let app = spawn_app_with(config, Arc::new(RecordingMailer::default())).await;
    app.bootstrap("alice", None).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "alice", "password": PASSWORD })),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Server configuration error");
    assert!(body["details"].as_str().unwrap().contains("JWT_SECRET"));
}

#[tokio::test]
async fn production_hides_server_error_details() {
    let config = cms_backend::config::Config {
        jwt_secret: None,
        environment: cms_backend::config::Environment::Production,
        ..test_config()
    };
    let app = spawn_app_with(config, Arc::new(RecordingMailer::default())).await;
    app.bootstrap("alice", None).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "alice", "password": PASSWORD })),
        )
        .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn session_guard_distinguishes_missing_and_invalid_tokens() {
    let app = spawn_app().await;
    app.bootstrap("alice", None).await;

    let (status, _) = app.request(Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(Method::GET, "/api/auth/me", Some("garbage.token.value"), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let token = app.login("alice", PASSWORD).await;
    let (status, body) = app.request(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert!(body.get("passwordHash").is_none());
}

#[tokio::test]
async fn bootstrap_grants_super_admin_only_to_the_first_account() {
    let app = spawn_app().await;
    let a = app.bootstrap("alice", Some("alice@club.fr")).await;
    let b = app.bootstrap("bob", Some("bob@club.fr")).await;
    assert!(a.is_super_admin);
    assert!(!b.is_super_admin);

    let bob_token = app.login("bob", PASSWORD).await;
    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/auth/admins/{}", a.id),
            Some(&bob_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let alice_token = app.login("alice", PASSWORD).await;
    let (status, body) = app
        .request(
            Method::DELETE,
            &format!("/api/auth/admins/{}", b.id),
            Some(&alice_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Admin deleted successfully");

    let (status, _) = app
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": "bob", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn super_admin_cannot_delete_self_or_other_super_admins() {
    let app = spawn_app().await;
    let alice = app.bootstrap("alice", None).await;
    let token = app.login("alice", PASSWORD).await;

    let (status, body) = app
        .request(
            Method::DELETE,
            &format!("/api/auth/admins/{}", alice.id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "You cannot delete your own account");

    let carol = app.bootstrap("carol", None).await;
    sqlx::query("UPDATE admins SET is_super_admin = 1 WHERE id = ?")
        .bind(&carol.id)
        .execute(&app.state.db)
        .await
        .unwrap();

    let (status, body) = app
        .request(
            Method::DELETE,
            &format!("/api/auth/admins/{}", carol.id),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Cannot delete another super administrator");

    let (status, _) = app
        .request(Method::DELETE, "/api/auth/admins/missing", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn demoted_super_admin_is_refused_with_old_token() {
    let app = spawn_app().await;
    let alice = app.bootstrap("alice", None).await;
    let token = app.login("alice", PASSWORD).await;

    let (status, _) = app
        .request(Method::GET, "/api/auth/admins", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    sqlx::query("UPDATE admins SET is_super_admin = 0 WHERE id = ?")
        .bind(&alice.id)
        .execute(&app.state.db)
        .await
        .unwrap();

    let (status, body) = app
        .request(Method::GET, "/api/auth/admins", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Super administrator access required");
}

#[tokio::test]
async fn super_admin_creates_regular_admins() {
    let app = spawn_app().await;
    app.bootstrap("alice", Some("alice@club.fr")).await;
    let token = app.login("alice", PASSWORD).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/auth/admins",
            Some(&token),
            Some(json!({ "username": "bob", "email": "bob@club.fr", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);

    let (status, body) = app
        .request(Method::GET, "/api/auth/admins", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let admins = body.as_array().unwrap();
    assert_eq!(admins.len(), 2);
    let bob = admins.iter().find(|a| a["username"] == "bob").unwrap();
    assert_eq!(bob["isSuperAdmin"], false);
    assert_eq!(bob["email"], "bob@club.fr");
}

#[tokio::test]
async fn create_admin_rejects_bad_input_and_duplicates() {
    let app = spawn_app().await;
    app.bootstrap("alice", Some("alice@club.fr")).await;
    let token = app.login("alice", PASSWORD).await;

    let cases = [
        (json!({ "username": "", "password": PASSWORD }), "Username and password are required"),
        (json!({ "username": "bob", "password": "123" }), "Password must be at least 6 characters"),
        (json!({ "username": "bob", "email": "nope", "password": PASSWORD }), "Invalid email format"),
        (json!({ "username": "alice", "password": PASSWORD }), "Username already exists"),
        (json!({ "username": "bob", "email": "alice@club.fr", "password": PASSWORD }), "Email already exists"),
    ];

    for (payload, expected) in cases {
        let (status, body) = app
            .request(Method::POST, "/api/auth/admins", Some(&token), Some(payload))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], expected);
    }
}

#[tokio::test]
async fn regular_admin_cannot_create_admins() {
    let app = spawn_app().await;
    app.bootstrap("alice", None).await;
    app.bootstrap("bob", None).await;
    let token = app.login("bob", PASSWORD).await;

    let (status, _) = app
        .request(
            Method::POST,
            "/api/auth/admins",
            Some(&token),
            Some(json!({ "username": "mallory", "password": PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn regular_admin_updating_someone_else_is_forbidden_before_validation() {
    let app = spawn_app().await;
    let alice = app.bootstrap("alice", None).await;
    app.bootstrap("bob", None).await;
    let token = app.login("bob", PASSWORD).await;

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/api/auth/admins/{}", alice.id),
            Some(&token),
            Some(json!({ "username": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "You can only modify your own account");
}

#[tokio::test]
async fn admin_updates_own_account() {
    let app = spawn_app().await;
    app.bootstrap("alice", Some("alice@club.fr")).await;
    let bob = app.bootstrap("bob", None).await;
    let token = app.login("bob", PASSWORD).await;

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/api/auth/admins/{}", bob.id),
            Some(&token),
            Some(json!({ "username": "alice" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already exists");

    let (status, _) = app
        .request(
            Method::PUT,
            &format!("/api/auth/admins/{}", bob.id),
            Some(&token),
            Some(json!({ "username": "robert", "email": "rob@club.fr", "password": "newpass1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let token = app.login("ROBERT", "newpass1").await;
    let (_, me) = app.request(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(me["email"], "rob@club.fr");
}

#[tokio::test]
async fn super_admin_resets_another_admins_password() {
    let app = spawn_app().await;
    let alice = app.bootstrap("alice", None).await;
    let bob = app.bootstrap("bob", None).await;
    let token = app.login("alice", PASSWORD).await;

    let (status, body) = app
        .request(
            Method::POST,
            &format!("/api/auth/admins/{}/reset-password", alice.id),
            Some(&token),
            Some(json!({ "newPassword": "another1" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Use the regular password reset for your own account");

    let (status, _) = app
        .request(
            Method::POST,
            "/api/auth/admins/ghost/reset-password",
            Some(&token),
            Some(json!({ "newPassword": "another1" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .request(
            Method::POST,
            &format!("/api/auth/admins/{}/reset-password", bob.id),
            Some(&token),
            Some(json!({ "newPassword": "12" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "New password must be at least 6 characters");

    let (status, _) = app
        .request(
            Method::POST,
            &format!("/api/auth/admins/{}/reset-password", bob.id),
            Some(&token),
            Some(json!({ "newPassword": "another1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    app.login("bob", "another1").await;
}

#[tokio::test]
async fn super_admin_updates_another_admin_without_touching_password() {
    let app = spawn_app().await;
    app.bootstrap("alice", Some("alice@club.fr")).await;
    let bob = app.bootstrap("bob", Some("bob@club.fr")).await;
    let token = app.login("alice", PASSWORD).await;
    let hash_before = app.password_hash(&bob.id).await;

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/api/auth/admins/{}", bob.id),
            Some(&token),
            Some(json!({ "username": "bobby", "email": "bobby@club.fr" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], "Admin updated successfully");
    assert_eq!(app.password_hash(&bob.id).await, hash_before);

    let bob_token = app.login("bobby", PASSWORD).await;
    let (_, me) = app.request(Method::GET, "/api/auth/me", Some(&bob_token), None).await;
    assert_eq!(me["email"], "bobby@club.fr");

    let (status, _) = app
        .request(
            Method::PUT,
            &format!("/api/auth/admins/{}", bob.id),
            Some(&token),
            Some(json!({ "username": "bobby", "email": "bobby@club.fr", "password": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.password_hash(&bob.id).await, hash_before);
}

#[tokio::test]
async fn update_rejects_taken_email_and_unknown_ids() {
    let app = spawn_app().await;
    app.bootstrap("alice", Some("alice@club.fr")).await;
    let bob = app.bootstrap("bob", Some("bob@club.fr")).await;
    let token = app.login("alice", PASSWORD).await;

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/api/auth/admins/{}", bob.id),
            Some(&token),
            Some(json!({ "username": "bob", "email": "alice@club.fr" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already exists");

    let (status, body) = app
        .request(
            Method::PUT,
            "/api/auth/admins/no-such-admin",
            Some(&token),
            Some(json!({ "username": "ghost" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Admin not found");
}
