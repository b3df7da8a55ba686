use chrono::Utc;
use sqlx::{types::Json, SqlitePool};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::blog::ContentFilter;
use crate::models::portfolio::{CreatePortfolioRequest, PortfolioItemRow, UpdatePortfolioRequest};
use crate::services::session::Principal;

const SELECT_ITEM: &str = r#"
    SELECT p.id, p.title, p.description, p.content, p.category, p.image_url, p.images, p.tags,
           p.stats, p.featured, p.published, p.created_by, p.created_at, p.updated_at,
           a.username AS creator_username
    FROM portfolio_items p
    LEFT JOIN admins a ON a.id = p.created_by
"#;

pub async fn list(pool: &SqlitePool, filter: &ContentFilter) -> Result<Vec<PortfolioItemRow>, AppError> {
    let sql = format!(
        "{} WHERE (? = 0 OR p.published = 1) AND (? = 0 OR p.featured = 1) ORDER BY p.created_at DESC, p.rowid DESC",
        SELECT_ITEM
    );
    let rows = sqlx::query_as::<_, PortfolioItemRow>(&sql)
        .bind(filter.published_only())
        .bind(filter.featured_only())
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find(pool: &SqlitePool, id: &str) -> Result<Option<PortfolioItemRow>, AppError> {
    let sql = format!("{} WHERE p.id = ?", SELECT_ITEM);
    let row = sqlx::query_as::<_, PortfolioItemRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(
    pool: &SqlitePool,
    creator: &Principal,
    request: CreatePortfolioRequest,
) -> Result<PortfolioItemRow, AppError> {
    let title = request.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::validation("Title is required"));
    }

    let id = Uuid::new_v4().to_string();
    let now = Utc::now();
    let image_url = request.images.first().cloned();
    let tags = request.tags.map(|tags| tags.into_tags()).unwrap_or_default();

    sqlx::query(
        r#"
        INSERT INTO portfolio_items
            (id, title, description, content, category, image_url, images, tags,
             stats, featured, published, created_by, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&title)
    .bind(&request.description)
    .bind(&request.content)
    .bind(&request.category)
    .bind(&image_url)
    .bind(Json(&request.images))
    .bind(Json(&tags))
    .bind(&request.stats)
    .bind(request.featured)
    .bind(request.published)
    .bind(&creator.id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    tracing::info!(item_id = %id, created_by = %creator.id, "Portfolio item created");

    find(pool, &id)
        .await?
        .ok_or_else(|| AppError::internal("created portfolio item vanished"))
}

pub async fn update(
    pool: &SqlitePool,
    id: &str,
    request: UpdatePortfolioRequest,
) -> Result<PortfolioItemRow, AppError> {
    let existing = find(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Portfolio item not found"))?;

    let title = request
        .title
        .map(|title| title.trim().to_string())
        .filter(|title| !title.is_empty())
        .unwrap_or(existing.title);
    let (images, image_url) = match request.images {
        Some(images) => {
            let first = images.first().cloned();
            (images, first)
        }
        None => (existing.images.0, existing.image_url),
    };
    let tags = match request.tags {
        Some(tags) => tags.into_tags(),
        None => existing.tags.0,
    };

    sqlx::query(
        r#"
        UPDATE portfolio_items
        SET title = ?, description = ?, content = ?, category = ?, image_url = ?, images = ?,
            tags = ?, stats = ?, featured = ?, published = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&title)
    .bind(request.description.or(existing.description))
    .bind(request.content.or(existing.content))
    .bind(request.category.or(existing.category))
    .bind(&image_url)
    .bind(Json(&images))
    .bind(Json(&tags))
    .bind(request.stats.or(existing.stats))
    .bind(request.featured.unwrap_or(existing.featured))
    .bind(request.published.unwrap_or(existing.published))
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;

    find(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Portfolio item not found"))
}

pub async fn delete(pool: &SqlitePool, id: &str) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM portfolio_items WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Portfolio item not found"));
    }
    tracing::info!(item_id = %id, "Portfolio item deleted");
    Ok(())
}
