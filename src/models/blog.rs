use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::{IntoParams, ToSchema};

/// Author label shown when neither the creator nor a stored author is known.
pub const FALLBACK_AUTHOR: &str = "Admin";

#[derive(Debug, Clone, FromRow)]
pub struct BlogArticleRow {
    pub id: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub images: Json<Vec<String>>,
    pub featured: bool,
    pub read_time: Option<String>,
    pub published: bool,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Joined from `admins`; `None` once the creator is deleted.
    pub creator_username: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlogArticle {
    pub id: String,
    pub title: String,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub author: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub images: Vec<String>,
    pub featured: bool,
    pub read_time: Option<String>,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_username: Option<String>,
}

impl BlogArticleRow {
    /// Creator fields are only exposed to authenticated readers.
    pub fn into_article(self, include_creator: bool) -> BlogArticle {
        let author = self
            .creator_username
            .clone()
            .or(self.author)
            .unwrap_or_else(|| FALLBACK_AUTHOR.to_string());

        let (created_by_id, created_by_username) = match (include_creator, self.creator_username) {
            (true, Some(username)) => (self.created_by, Some(username)),
            _ => (None, None),
        };

        BlogArticle {
            id: self.id,
            title: self.title,
            excerpt: self.excerpt,
            content: self.content,
            author,
            category: self.category,
            image_url: self.image_url,
            images: self.images.0,
            featured: self.featured,
            read_time: self.read_time,
            published: self.published,
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by_id,
            created_by_username,
        }
    }
}

/// Shared list filter for blog and portfolio. Only `true` narrows the result.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContentFilter {
    pub featured: Option<bool>,
    pub published: Option<bool>,
}

impl ContentFilter {
    pub fn featured_only(&self) -> bool {
        self.featured == Some(true)
    }

    pub fn published_only(&self) -> bool {
        self.published == Some(true)
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateArticleRequest {
    /// Required, must be non-empty.
    #[serde(default)]
    pub title: String,
    /// Defaults to null.
    pub excerpt: Option<String>,
    /// Defaults to null.
    pub content: Option<String>,
    /// Defaults to null.
    pub category: Option<String>,
    /// Hosted image URLs; defaults to empty. The first one becomes `imageUrl`.
    #[serde(default)]
    pub images: Vec<String>,
    /// Defaults to false.
    #[serde(default)]
    pub featured: bool,
    /// Defaults to null.
    pub read_time: Option<String>,
    /// Defaults to false.
    #[serde(default)]
    pub published: bool,
}

/// Absent fields keep their stored value.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateArticleRequest {
    /// Ignored when empty.
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    /// Replaces the whole list; `imageUrl` follows its first entry.
    pub images: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub read_time: Option<String>,
    pub published: Option<bool>,
}
