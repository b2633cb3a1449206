//! Data Transfer Objects - request payloads and view-models for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quill_core::domain::{Category, CommentStatus, PostStatus, Role, User};
use quill_core::ports::{CommentRecord, Page, PostRecord};

use crate::response::FieldError;

// ---------------------------------------------------------------------------
// Requests

/// Request to register a new user. Registration always creates an author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Author-supplied post fields for create and update.
///
/// `status` arrives as a plain string so an unknown value surfaces as a
/// field-level validation message rather than a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostPayload {
    pub title: String,
    pub excerpt: String,
    pub content: String,
    pub status: String,
    pub category_id: Option<Uuid>,
}

impl PostPayload {
    pub const TITLE_MAX: usize = 255;
    pub const EXCERPT_MAX: usize = 500;

    /// Field validation; category existence is checked by the handler
    /// against the store.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push(FieldError::new("title", "Post title is required."));
        } else if self.title.chars().count() > Self::TITLE_MAX {
            errors.push(FieldError::new(
                "title",
                "The title may not be greater than 255 characters.",
            ));
        }

        if self.excerpt.trim().is_empty() {
            errors.push(FieldError::new("excerpt", "Post excerpt is required."));
        } else if self.excerpt.chars().count() > Self::EXCERPT_MAX {
            errors.push(FieldError::new(
                "excerpt",
                "The excerpt may not be greater than 500 characters.",
            ));
        }

        if self.content.trim().is_empty() {
            errors.push(FieldError::new("content", "Post content is required."));
        }

        if self.status.parse::<PostStatus>().is_err() {
            errors.push(FieldError::new(
                "status",
                "Post status must be draft or published.",
            ));
        }

        errors
    }
}

/// Admin-supplied category fields for create and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPayload {
    pub name: String,
    pub description: Option<String>,
}

impl CategoryPayload {
    pub const NAME_MAX: usize = 255;
    pub const DESCRIPTION_MAX: usize = 500;

    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push(FieldError::new("name", "Category name is required."));
        } else if self.name.chars().count() > Self::NAME_MAX {
            errors.push(FieldError::new(
                "name",
                "The name may not be greater than 255 characters.",
            ));
        }

        if let Some(description) = &self.description {
            if description.chars().count() > Self::DESCRIPTION_MAX {
                errors.push(FieldError::new(
                    "description",
                    "The description may not be greater than 500 characters.",
                ));
            }
        }

        errors
    }
}

/// A new comment on a post. Any client-supplied status is ignored; comments
/// always start pending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentPayload {
    pub post_id: Uuid,
    pub content: String,
}

impl CommentPayload {
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.content.trim().is_empty() {
            errors.push(FieldError::new("content", "Comment content is required."));
        }
        errors
    }
}

/// Moderation request: move a comment to another status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentStatusPayload {
    pub status: String,
}

impl CommentStatusPayload {
    pub fn parse(&self) -> Result<CommentStatus, FieldError> {
        self.status.parse::<CommentStatus>().map_err(|_| {
            FieldError::new("status", "Status must be pending, approved, or rejected.")
        })
    }
}

// ---------------------------------------------------------------------------
// Responses and view-models

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// A user's public information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Minimal author reference embedded in posts and comments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: Uuid,
    pub name: String,
}

impl From<User> for AuthorRef {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            created_at: category.created_at,
        }
    }
}

/// Post card for listings; no body content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub author: AuthorRef,
    pub category: Option<CategoryResponse>,
}

impl From<PostRecord> for PostSummary {
    fn from(record: PostRecord) -> Self {
        Self {
            id: record.post.id,
            title: record.post.title,
            slug: record.post.slug,
            excerpt: record.post.excerpt,
            status: record.post.status,
            published_at: record.post.published_at,
            created_at: record.post.created_at,
            author: record.author.into(),
            category: record.category.map(Into::into),
        }
    }
}

/// Full post payload for detail pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    pub content: String,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: AuthorRef,
    pub category: Option<CategoryResponse>,
}

impl From<PostRecord> for PostDetail {
    fn from(record: PostRecord) -> Self {
        Self {
            id: record.post.id,
            title: record.post.title,
            slug: record.post.slug,
            excerpt: record.post.excerpt,
            content: record.post.content,
            status: record.post.status,
            published_at: record.post.published_at,
            created_at: record.post.created_at,
            updated_at: record.post.updated_at,
            author: record.author.into(),
            category: record.category.map(Into::into),
        }
    }
}

/// A comment with its author, as rendered under a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub id: Uuid,
    pub content: String,
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
    pub author: AuthorRef,
}

impl From<CommentRecord> for CommentView {
    fn from(record: CommentRecord) -> Self {
        Self {
            id: record.comment.id,
            content: record.comment.content,
            status: record.comment.status,
            created_at: record.comment.created_at,
            author: record.author.into(),
        }
    }
}

/// Post reference shown next to a comment in the moderation queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRef {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
}

/// Moderation listing row: comment, author, and the post it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentListItem {
    pub id: Uuid,
    pub content: String,
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
    pub author: AuthorRef,
    pub post: Option<PostRef>,
}

impl From<CommentRecord> for CommentListItem {
    fn from(record: CommentRecord) -> Self {
        Self {
            id: record.comment.id,
            content: record.comment.content,
            status: record.comment.status,
            created_at: record.comment.created_at,
            author: record.author.into(),
            post: record.post.map(|p| PostRef {
                id: p.id,
                title: p.title,
                slug: p.slug,
            }),
        }
    }
}

/// Pagination metadata echoed with every listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMeta {
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub last_page: u64,
}

/// One page of listing data plus its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paged<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T, U> From<Page<U>> for Paged<T>
where
    T: From<U>,
{
    fn from(page: Page<U>) -> Self {
        let meta = PageMeta {
            total: page.total,
            page: page.page,
            per_page: page.per_page,
            last_page: page.last_page(),
        };
        Self {
            data: page.items.into_iter().map(Into::into).collect(),
            meta,
        }
    }
}

// ---------------------------------------------------------------------------
// Page-level view-models

/// Home page: published posts, category navigation, featured post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogIndexView {
    pub posts: Paged<PostSummary>,
    pub categories: Vec<CategoryResponse>,
    pub featured_post: Option<PostSummary>,
}

/// Public post detail: approved comments only, plus related posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlogShowView {
    pub post: PostDetail,
    pub comments: Vec<CommentView>,
    pub comment_count: u64,
    pub related_posts: Vec<PostSummary>,
}

/// Public category page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryBlogView {
    pub category: CategoryResponse,
    pub posts: Paged<PostSummary>,
}

/// Role-scoped dashboard statistics. Author-only fields are zero for
/// non-admins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_posts: u64,
    pub published_posts: u64,
    pub draft_posts: u64,
    pub total_comments: u64,
    pub pending_comments: u64,
    pub total_categories: u64,
}

/// Recent post row on the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentPost {
    pub id: Uuid,
    pub title: String,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub comments_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardView {
    pub stats: DashboardStats,
    pub recent_posts: Vec<RecentPost>,
}

/// Filters echoed back with the dashboard post listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostFilters {
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListView {
    pub posts: Paged<PostSummary>,
    pub filters: PostFilters,
}

/// Dashboard post detail: the post with every comment, whatever its status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostShowView {
    pub post: PostDetail,
    pub comments: Vec<CommentView>,
}

/// Edit form payload: the post plus all categories to pick from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostEditView {
    pub post: PostDetail,
    pub categories: Vec<CategoryResponse>,
}

/// Filters echoed back with the moderation listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentFilters {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentListView {
    pub comments: Paged<CommentListItem>,
    pub filters: CommentFilters,
}
