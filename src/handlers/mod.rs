use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

pub mod admin;
pub mod auth;
pub mod blog;
pub mod portfolio;

#[derive(Debug, Serialize, ToSchema)]
pub struct Health {
    pub ok: bool,
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up", body = Health)
    )
)]
pub async fn health() -> Json<Health> {
    Json(Health { ok: true })
}
