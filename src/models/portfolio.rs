use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;

use super::blog::FALLBACK_AUTHOR;

#[derive(Debug, Clone, FromRow)]
pub struct PortfolioItemRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub images: Json<Vec<String>>,
    pub tags: Json<Vec<String>>,
    pub stats: Option<String>,
    pub featured: bool,
    pub published: bool,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub creator_username: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioItem {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub author: String,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub stats: Option<String>,
    pub featured: bool,
    pub published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_username: Option<String>,
}

impl PortfolioItemRow {
    pub fn into_item(self, include_creator: bool) -> PortfolioItem {
        let author = self
            .creator_username
            .clone()
            .unwrap_or_else(|| FALLBACK_AUTHOR.to_string());

        let (created_by_id, created_by_username) = match (include_creator, self.creator_username) {
            (true, Some(username)) => (self.created_by, Some(username)),
            _ => (None, None),
        };

        PortfolioItem {
            id: self.id,
            title: self.title,
            description: self.description,
            content: self.content,
            author,
            category: self.category,
            image_url: self.image_url,
            images: self.images.0,
            tags: self.tags.0,
            stats: self.stats,
            featured: self.featured,
            published: self.published,
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by_id,
            created_by_username,
        }
    }
}

/// Tags arrive either as a JSON array or as a comma-separated string.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Csv(String),
}

impl TagsInput {
    pub fn into_tags(self) -> Vec<String> {
        match self {
            TagsInput::List(tags) => tags,
            TagsInput::Csv(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePortfolioRequest {
    /// Required, must be non-empty.
    #[serde(default)]
    pub title: String,
    /// Defaults to null.
    pub description: Option<String>,
    /// Defaults to null.
    pub content: Option<String>,
    /// Defaults to null.
    pub category: Option<String>,
    /// Defaults to empty.
    pub tags: Option<TagsInput>,
    /// Defaults to null.
    pub stats: Option<String>,
    /// Hosted image URLs; defaults to empty. The first one becomes `imageUrl`.
    #[serde(default)]
    pub images: Vec<String>,
    /// Defaults to false.
    #[serde(default)]
    pub featured: bool,
    /// Defaults to false.
    #[serde(default)]
    pub published: bool,
}

/// Absent fields keep their stored value.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePortfolioRequest {
    /// Ignored when empty.
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<TagsInput>,
    pub stats: Option<String>,
    pub images: Option<Vec<String>>,
    pub featured: Option<bool>,
    pub published: Option<bool>,
}
