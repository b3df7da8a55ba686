use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;

use crate::error::{AppError, ErrorDetails};
use crate::services::session::{bearer_token, Principal};
use crate::AppState;

/// Validates the bearer token and attaches the [`Principal`] to the request.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let principal = state.auth.require_session(bearer_token(req.headers()))?;
    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Must run inside `auth_middleware`.
pub async fn require_super_admin(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let principal = req
        .extensions()
        .get::<Principal>()
        .cloned()
        .ok_or(AppError::MissingToken)?;

    state.auth.require_super_admin(&principal).await?;
    Ok(next.run(req).await)
}

/// Outside production, server errors also carry their diagnostic in `details`.
pub async fn expose_error_details(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let response = next.run(req).await;
    if state.config.is_production() {
        return response;
    }

    match response.extensions().get::<ErrorDetails>().cloned() {
        Some(details) => (
            response.status(),
            Json(json!({ "error": details.message, "details": details.details })),
        )
            .into_response(),
        None => response,
    }
}
