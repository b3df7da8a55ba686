use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod bg_task;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod openapi;
pub mod services;
pub mod store;
pub mod utils;

use config::Config;
use error::AppError;
use services::auth::{AuthService, AuthSettings};
use services::mailer::Mailer;
use services::session::SessionKeys;
use store::SqliteStore;

// Application State
pub struct AppState {
    pub config: Config,
    pub db: SqlitePool,
    pub store: Arc<SqliteStore>,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(config: Config, pool: SqlitePool, mailer: Arc<dyn Mailer>) -> Result<Self, AppError> {
        let store = Arc::new(SqliteStore::new(pool.clone()));
        let auth = AuthService::new(
            store.clone(),
            store.clone(),
            mailer,
            SessionKeys::new(config.jwt_secret.as_deref()),
            AuthSettings::from(&config),
        )?;

        Ok(Self {
            config,
            db: pool,
            store,
            auth,
        })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    let session = || from_fn_with_state(state.clone(), middleware::auth_middleware);
    let super_admin = || from_fn_with_state(state.clone(), middleware::require_super_admin);

    let auth_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/forgot-password", post(handlers::auth::forgot_password))
        .route("/reset-password", post(handlers::auth::reset_password))
        .route("/me", get(handlers::auth::me).route_layer(session()))
        .route(
            "/admins",
            get(handlers::admin::list_admins)
                .post(handlers::admin::create_admin)
                .route_layer(super_admin())
                .route_layer(session()),
        )
        .route(
            "/admins/:id",
            put(handlers::admin::update_admin)
                .merge(axum::routing::delete(handlers::admin::delete_admin).route_layer(super_admin()))
                .route_layer(session()),
        )
        .route(
            "/admins/:id/reset-password",
            post(handlers::admin::reset_admin_password)
                .route_layer(super_admin())
                .route_layer(session()),
        );

    let blog_routes = Router::new()
        .route(
            "/",
            get(handlers::blog::list_articles)
                .merge(post(handlers::blog::create_article).route_layer(session())),
        )
        .route(
            "/:id",
            get(handlers::blog::get_article).merge(
                put(handlers::blog::update_article)
                    .delete(handlers::blog::delete_article)
                    .route_layer(session()),
            ),
        );

    let portfolio_routes = Router::new()
        .route(
            "/",
            get(handlers::portfolio::list_items)
                .merge(post(handlers::portfolio::create_item).route_layer(session())),
        )
        .route(
            "/:id",
            get(handlers::portfolio::get_item).merge(
                put(handlers::portfolio::update_item)
                    .delete(handlers::portfolio::delete_item)
                    .route_layer(session()),
            ),
        );

    Router::new()
        .route("/", get(root))
        .route("/api/health", get(handlers::health))
        .nest("/api/auth", auth_routes)
        .nest("/api/blog", blog_routes)
        .nest("/api/portfolio", portfolio_routes)
        .layer(from_fn_with_state(state.clone(), middleware::expose_error_details))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn root() -> &'static str {
    "CMS Backend API"
}
