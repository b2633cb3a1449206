use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::slug::slugify;

/// Publication state of a post.
///
/// The dashboard UI historically styled an "archived" state as well, but no
/// write path ever produces one, so it is not part of the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(format!("unknown post status: {other}")),
        }
    }
}

/// The author-supplied fields of a post, already validated by the caller.
#[derive(Debug, Clone)]
pub struct PostContent {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub status: PostStatus,
    pub category_id: Option<Uuid>,
}

/// Post entity - a blog article owned by its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post, deriving `slug` and `published_at` at write time.
    pub fn new(author_id: Uuid, content: PostContent) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            category_id: content.category_id,
            slug: slugify(&content.title),
            title: content.title,
            excerpt: content.excerpt,
            content: content.content,
            published_at: match content.status {
                PostStatus::Published => Some(now),
                PostStatus::Draft => None,
            },
            status: content.status,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an update, re-deriving `slug` and `published_at` the same way
    /// creation does. Moving to draft clears `published_at`.
    pub fn apply(&mut self, content: PostContent) {
        let now = Utc::now();
        self.slug = slugify(&content.title);
        self.title = content.title;
        self.excerpt = content.excerpt;
        self.content = content.content;
        self.category_id = content.category_id;
        self.published_at = match content.status {
            PostStatus::Published => Some(now),
            PostStatus::Draft => None,
        };
        self.status = content.status;
        self.updated_at = now;
    }

    /// Whether the post is visible on the public blog.
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }
}
