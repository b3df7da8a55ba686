use chrono::Utc;
use sqlx::{types::Json, SqlitePool};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::blog::{
    BlogArticleRow, ContentFilter, CreateArticleRequest, UpdateArticleRequest,
};
use crate::services::session::Principal;

const SELECT_ARTICLE: &str = r#"
    SELECT b.id, b.title, b.excerpt, b.content, b.author, b.category, b.image_url, b.images,
           b.featured, b.read_time, b.published, b.created_by, b.created_at, b.updated_at,
           a.username AS creator_username
    FROM blog_articles b
    LEFT JOIN admins a ON a.id = b.created_by
"#;

pub async fn list(pool: &SqlitePool, filter: &ContentFilter) -> Result<Vec<BlogArticleRow>, AppError> {
    let sql = format!(
        "{} WHERE (? = 0 OR b.published = 1) AND (? = 0 OR b.featured = 1) ORDER BY b.created_at DESC, b.rowid DESC",
        SELECT_ARTICLE
    );
    let rows = sqlx::query_as::<_, BlogArticleRow>(&sql)
        .bind(filter.published_only())
        .bind(filter.featured_only())
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find(pool: &SqlitePool, id: &str) -> Result<Option<BlogArticleRow>, AppError> {
    let sql = format!("{} WHERE b.id = ?", SELECT_ARTICLE);
    let row = sqlx::query_as::<_, BlogArticleRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn create(
    pool: &SqlitePool,
    creator: &Principal,
    request: CreateArticleRequest,
) -> Result<BlogArticleRow, AppError> {
    let title = request.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::validation("Title is required"));
    }

    let id = Uuid::new_v4().to_string();
    let now = Utc::now();
    let image_url = request.images.first().cloned();

    sqlx::query(
        r#"
        INSERT INTO blog_articles
            (id, title, excerpt, content, author, category, image_url, images,
             featured, read_time, published, created_by, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&title)
    .bind(&request.excerpt)
    .bind(&request.content)
    .bind(&creator.username)
    .bind(&request.category)
    .bind(&image_url)
    .bind(Json(&request.images))
    .bind(request.featured)
    .bind(&request.read_time)
    .bind(request.published)
    .bind(&creator.id)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    tracing::info!(article_id = %id, created_by = %creator.id, "Blog article created");

    find(pool, &id)
        .await?
        .ok_or_else(|| AppError::internal("created article vanished"))
}

pub async fn update(
    pool: &SqlitePool,
    id: &str,
    request: UpdateArticleRequest,
) -> Result<BlogArticleRow, AppError> {
    let existing = find(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Article not found"))?;

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

    sqlx::query(
        r#"
        UPDATE blog_articles
        SET title = ?, excerpt = ?, content = ?, category = ?, image_url = ?, images = ?,
            featured = ?, read_time = ?, published = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&title)
    .bind(request.excerpt.or(existing.excerpt))
    .bind(request.content.or(existing.content))
    .bind(request.category.or(existing.category))
    .bind(&image_url)
    .bind(Json(&images))
    .bind(request.featured.unwrap_or(existing.featured))
    .bind(request.read_time.or(existing.read_time))
    .bind(request.published.unwrap_or(existing.published))
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;

    find(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Article not found"))
}

pub async fn delete(pool: &SqlitePool, id: &str) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM blog_articles WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Article not found"));
    }
    tracing::info!(article_id = %id, "Blog article deleted");
    Ok(())
}
