use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing_subscriber::EnvFilter;

use cms_backend::config::Config;
use cms_backend::models::admin::CreateAdminRequest;
use cms_backend::services::mailer::DisabledMailer;
use cms_backend::store::AdminStore;
use cms_backend::{bg_task, db, router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("invalid configuration")?;
    if config.jwt_secret.is_none() {
        tracing::warn!("JWT_SECRET is not set; logins will fail until it is configured");
    }

    let pool = db::establish_connection(&config.database_url)
        .await
        .context("failed to open database")?;

    let addr = config.socket_addr()?;
    let cleanup_every = config.token_cleanup_interval_secs;
    let state = Arc::new(AppState::new(config, pool, Arc::new(DisabledMailer))?);

    ensure_bootstrap_admin(&state).await?;

    let tokens = state.store.clone();
    tokio::spawn(async move {
        bg_task::start_token_cleanup(tokens, cleanup_every).await;
    });

    let app = router(state);

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// Creates the first account from `BOOTSTRAP_ADMIN_*` when the table is empty.
async fn ensure_bootstrap_admin(state: &AppState) -> anyhow::Result<()> {
    let existing = state.store.list_all().await?;
    if !existing.is_empty() {
        return Ok(());
    }

    match state.config.bootstrap_admin.clone() {
        Some(bootstrap) => {
            tracing::info!("No admins found. Creating bootstrap admin '{}'.", bootstrap.username);
            state
                .auth
                .bootstrap_admin(CreateAdminRequest {
                    username: bootstrap.username,
                    email: bootstrap.email,
                    password: bootstrap.password,
                })
                .await?;
        }
        None => tracing::warn!(
            "No admins found. Set BOOTSTRAP_ADMIN_USERNAME/BOOTSTRAP_ADMIN_PASSWORD or run `admin-cli init`."
        ),
    }
    Ok(())
}
