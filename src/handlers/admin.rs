use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::error::AppError;
use crate::extract::Json;
use crate::models::admin::{
    AdminProfile, AdminResetPasswordRequest, CreateAdminRequest, MessageResponse,
    UpdateAdminRequest,
};
use crate::services::session::Principal;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/auth/admins",
    responses(
        (status = 200, description = "All admins, newest first", body = Vec<AdminProfile>),
        (status = 403, description = "Super administrator access required")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn list_admins(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<AdminProfile>>, AppError> {
    Ok(Json(state.auth.list_admins().await?))
}

#[utoipa::path(
    post,
    path = "/api/auth/admins",
    request_body = CreateAdminRequest,
    responses(
        (status = 201, description = "Admin created", body = MessageResponse),
        (status = 400, description = "Invalid input or duplicate username/email"),
        (status = 403, description = "Super administrator access required")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn create_admin(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateAdminRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.auth.create_admin(&principal, payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Admin created successfully")),
    ))
}

#[utoipa::path(
    put,
    path = "/api/auth/admins/{id}",
    params(("id" = String, Path, description = "Admin id")),
    request_body = UpdateAdminRequest,
    responses(
        (status = 200, description = "Admin updated", body = MessageResponse),
        (status = 400, description = "Invalid input or duplicate username/email"),
        (status = 403, description = "Not your account"),
        (status = 404, description = "Admin not found")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn update_admin(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateAdminRequest>,
) -> Result<impl IntoResponse, AppError> {
    state.auth.update_admin(&principal, &id, payload).await?;
    Ok(Json(MessageResponse::new("Admin updated successfully")))
}

#[utoipa::path(
    delete,
    path = "/api/auth/admins/{id}",
    params(("id" = String, Path, description = "Admin id")),
    responses(
        (status = 200, description = "Admin deleted", body = MessageResponse),
        (status = 400, description = "Self or super administrator target"),
        (status = 404, description = "Admin not found")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn delete_admin(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    state.auth.delete_admin(&principal, &id).await?;
    Ok(Json(MessageResponse::new("Admin deleted successfully")))
}

#[utoipa::path(
    post,
    path = "/api/auth/admins/{id}/reset-password",
    params(("id" = String, Path, description = "Admin id")),
    request_body = AdminResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Password too short or own account"),
        (status = 404, description = "Admin not found")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn reset_admin_password(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    Json(payload): Json<AdminResetPasswordRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .auth
        .admin_resets_other_password(&principal, &id, payload.new_password)
        .await?;
    Ok(Json(MessageResponse::new("Password reset successfully")))
}
