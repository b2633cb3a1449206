use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Comment, CommentStatus, Post, PostStatus, User};
use crate::error::RepoError;

/// One page of an ordered listing.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl<T> Page<T> {
    /// Number of the last page (1-based); at least 1 even when empty.
    pub fn last_page(&self) -> u64 {
        if self.total == 0 {
            1
        } else {
            self.total.div_ceil(self.per_page.max(1))
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

/// Filters for the dashboard post listing.
///
/// `author_id` is set by the handler for non-admin actors so authors only
/// ever see their own posts. `search` is a case-insensitive substring match
/// over title or excerpt. Results are ordered by creation time, newest first.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    pub author_id: Option<Uuid>,
    pub status: Option<PostStatus>,
    pub search: Option<String>,
    pub page: u64,
    pub per_page: u64,
}

/// Filters for the comment moderation listing, newest first.
#[derive(Debug, Clone, Default)]
pub struct CommentQuery {
    pub status: Option<CommentStatus>,
    pub page: u64,
    pub per_page: u64,
}

/// A post hydrated with its author and category, the shape listings render.
#[derive(Debug, Clone)]
pub struct PostRecord {
    pub post: Post,
    pub author: User,
    pub category: Option<Category>,
}

/// A comment hydrated with its author, plus the post for moderation views.
#[derive(Debug, Clone)]
pub struct CommentRecord {
    pub comment: Comment,
    pub author: User,
    pub post: Option<Post>,
}

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Update an existing entity; `NotFound` if it no longer exists.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID (hard delete).
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository - all listing contracts of the platform.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Find a post by its slug, regardless of status.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Find a post with its author and category hydrated.
    async fn find_record(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError>;

    /// Dashboard listing: filtered per `PostQuery`, created_at descending.
    async fn list(&self, query: &PostQuery) -> Result<Page<PostRecord>, RepoError>;

    /// Public listing: published posts only, published_at descending,
    /// optionally restricted to one category.
    async fn list_published(
        &self,
        category_id: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<Page<PostRecord>, RepoError>;

    /// Published posts sharing a category, excluding the given post,
    /// published_at descending. Empty when the post has no category.
    async fn related(
        &self,
        category_id: Option<Uuid>,
        exclude_id: Uuid,
        limit: u64,
    ) -> Result<Vec<PostRecord>, RepoError>;

    /// The most recently published post, if any.
    async fn latest_published(&self) -> Result<Option<PostRecord>, RepoError>;

    /// Most recently created posts, optionally scoped to one author.
    async fn recent(&self, author_id: Option<Uuid>, limit: u64) -> Result<Vec<Post>, RepoError>;

    /// Count posts, optionally scoped by author and/or status.
    async fn count(
        &self,
        author_id: Option<Uuid>,
        status: Option<PostStatus>,
    ) -> Result<u64, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// Find a category by its slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;

    /// All categories, name ascending.
    async fn list_all(&self) -> Result<Vec<Category>, RepoError>;

    /// Categories that have at least one post (navigation listing).
    async fn list_with_posts(&self) -> Result<Vec<Category>, RepoError>;

    /// Whether a category with this id exists.
    async fn exists(&self, id: Uuid) -> Result<bool, RepoError>;

    /// Total number of categories.
    async fn count(&self) -> Result<u64, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Moderation listing: filtered per `CommentQuery`, created_at
    /// descending, hydrated with author and post.
    async fn list(&self, query: &CommentQuery) -> Result<Page<CommentRecord>, RepoError>;

    /// Comments on a post with their authors, oldest first. `status` narrows
    /// to one moderation state (public views pass `Approved`).
    async fn list_for_post(
        &self,
        post_id: Uuid,
        status: Option<CommentStatus>,
    ) -> Result<Vec<CommentRecord>, RepoError>;

    /// Count comments, optionally by status.
    async fn count(&self, status: Option<CommentStatus>) -> Result<u64, RepoError>;

    /// Count comments on one post, optionally by status.
    async fn count_for_post(
        &self,
        post_id: Uuid,
        status: Option<CommentStatus>,
    ) -> Result<u64, RepoError>;
}
