use axum::{
    extract::{Extension, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;

use crate::error::AppError;
use crate::extract::Json;
use crate::models::admin::MessageResponse;
use crate::models::blog::{BlogArticle, ContentFilter, CreateArticleRequest, UpdateArticleRequest};
use crate::services::{blog, session::Principal};
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/blog",
    params(ContentFilter),
    responses(
        (status = 200, description = "Articles, newest first", body = Vec<BlogArticle>)
    )
)]
pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(filter): Query<ContentFilter>,
) -> Result<Json<Vec<BlogArticle>>, AppError> {
    let include_creator = state.auth.optional_principal(&headers).is_some();
    let rows = blog::list(&state.db, &filter).await?;
    Ok(Json(
        rows.into_iter()
            .map(|row| row.into_article(include_creator))
            .collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/api/blog/{id}",
    params(("id" = String, Path, description = "Article id")),
    responses(
        (status = 200, description = "Article", body = BlogArticle),
        (status = 404, description = "Article not found")
    )
)]
pub async fn get_article(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<BlogArticle>, AppError> {
    let include_creator = state.auth.optional_principal(&headers).is_some();
    let row = blog::find(&state.db, &id)
        .await?
        .ok_or_else(|| AppError::not_found("Article not found"))?;
    Ok(Json(row.into_article(include_creator)))
}

#[utoipa::path(
    post,
    path = "/api/blog",
    request_body = CreateArticleRequest,
    responses(
        (status = 201, description = "Article created", body = BlogArticle),
        (status = 400, description = "Title is required")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn create_article(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateArticleRequest>,
) -> Result<impl IntoResponse, AppError> {
    let row = blog::create(&state.db, &principal, payload).await?;
    Ok((StatusCode::CREATED, Json(row.into_article(true))))
}

#[utoipa::path(
    put,
    path = "/api/blog/{id}",
    params(("id" = String, Path, description = "Article id")),
    request_body = UpdateArticleRequest,
    responses(
        (status = 200, description = "Article updated", body = BlogArticle),
        (status = 404, description = "Article not found")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn update_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateArticleRequest>,
) -> Result<Json<BlogArticle>, AppError> {
    let row = blog::update(&state.db, &id, payload).await?;
    Ok(Json(row.into_article(true)))
}

#[utoipa::path(
    delete,
    path = "/api/blog/{id}",
    params(("id" = String, Path, description = "Article id")),
    responses(
        (status = 200, description = "Article deleted", body = MessageResponse),
        (status = 404, description = "Article not found")
    ),
    security(
        ("jwt" = [])
    )
)]
pub async fn delete_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    blog::delete(&state.db, &id).await?;
    Ok(Json(MessageResponse::new("Article deleted successfully")))
}
