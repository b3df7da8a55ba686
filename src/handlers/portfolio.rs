use axum::{
    extract::{Extension, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;

use crate::error::AppError;
use crate::extract::Json;
use crate::models::admin::MessageResponse;
use crate::models::blog::ContentFilter;
use crate::models::portfolio::{CreatePortfolioRequest, PortfolioItem, UpdatePortfolioRequest};
use crate::services::{portfolio, session::Principal};
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/portfolio",
    params(ContentFilter),
    responses(
        (status = 200, description = "Portfolio items, newest first", body = Vec<PortfolioItem>)
    )
)]
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(filter): Query<ContentFilter>,
) -> Result<Json<Vec<PortfolioItem>>, AppError> {
    let include_creator = state.auth.optional_principal(&headers).is_some();
    let rows = portfolio::list(&state.db, &filter).await?;
    Ok(Json(
        rows.into_iter()
            .map(|row| row.into_item(include_creator))
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/portfolio/{id}",
    params(("id" = String, Path, description = "Portfolio item id")),
    responses(
        (status = 200, description = "Portfolio item", body = PortfolioItem),
        (status = 404, description = "Portfolio item not found")
    )
)]
pub async fn get_item(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<PortfolioItem>, AppError> {
    let include_creator = state.auth.optional_principal(&headers).is_some();
    let row = portfolio::find(&state.db, &id)
        .await?
        .ok_or_else(|| AppError::not_found("Portfolio item not found"))?;
    Ok(Json(row.into_item(include_creator)))
}

#[utoipa::path(
    post,
    path = "/api/portfolio",
    request_body = CreatePortfolioRequest,
    responses(
        (status = 201, description = "Portfolio item created", body = PortfolioItem),
        (status = 400, description = "Title is required")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn create_item(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreatePortfolioRequest>,
) -> Result<impl IntoResponse, AppError> {
    let row = portfolio::create(&state.db, &principal, payload).await?;
    Ok((StatusCode::CREATED, Json(row.into_item(true))))
}

#[utoipa::path(
    put,
    path = "/api/portfolio/{id}",
    params(("id" = String, Path, description = "Portfolio item id")),
    request_body = UpdatePortfolioRequest,
    responses(
        (status = 200, description = "Portfolio item updated", body = PortfolioItem),
        (status = 404, description = "Portfolio item not found")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn update_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdatePortfolioRequest>,
) -> Result<Json<PortfolioItem>, AppError> {
    let row = portfolio::update(&state.db, &id, payload).await?;
    Ok(Json(row.into_item(true)))
}

#[utoipa::path(
    delete,
    path = "/api/portfolio/{id}",
    params(("id" = String, Path, description = "Portfolio item id")),
    responses(
        (status = 200, description = "Portfolio item deleted", body = MessageResponse),
        (status = 404, description = "Portfolio item not found")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn delete_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    portfolio::delete(&state.db, &id).await?;
    Ok(Json(MessageResponse::new("Portfolio item deleted successfully")))
}
