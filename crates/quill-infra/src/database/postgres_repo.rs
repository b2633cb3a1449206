//! PostgreSQL repository implementations.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ColumnTrait, Condition, DbConn, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use uuid::Uuid;

use quill_core::domain::{Category, Comment, CommentStatus, Post, PostStatus, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    CategoryRepository, CommentQuery, CommentRecord, CommentRepository, Page, PostQuery,
    PostRecord, PostRepository, UserRepository,
};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, map_db_err};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

async fn users_by_id(
    db: &DbConn,
    ids: HashSet<Uuid>,
) -> Result<HashMap<Uuid, User>, RepoError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let models = UserEntity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(map_db_err)?;

    Ok(models.into_iter().map(|m| (m.id, m.into())).collect())
}

async fn categories_by_id(
    db: &DbConn,
    ids: HashSet<Uuid>,
) -> Result<HashMap<Uuid, Category>, RepoError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let models = CategoryEntity::find()
        .filter(category::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(map_db_err)?;

    Ok(models.into_iter().map(|m| (m.id, m.into())).collect())
}

async fn posts_by_id(db: &DbConn, ids: HashSet<Uuid>) -> Result<HashMap<Uuid, Post>, RepoError> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let models = PostEntity::find()
        .filter(post::Column::Id.is_in(ids))
        .all(db)
        .await
        .map_err(map_db_err)?;

    Ok(models.into_iter().map(|m| (m.id, m.into())).collect())
}

/// Attach authors and categories to a batch of post rows. Rows whose author
/// vanished between the two reads are dropped.
async fn hydrate_posts(
    db: &DbConn,
    models: Vec<post::Model>,
) -> Result<Vec<PostRecord>, RepoError> {
    let author_ids: HashSet<Uuid> = models.iter().map(|m| m.author_id).collect();
    let category_ids: HashSet<Uuid> = models.iter().filter_map(|m| m.category_id).collect();

    let authors = users_by_id(db, author_ids).await?;
    let categories = categories_by_id(db, category_ids).await?;

    Ok(models
        .into_iter()
        .filter_map(|m| {
            let author = authors.get(&m.author_id).cloned()?;
            let category = m.category_id.and_then(|id| categories.get(&id).cloned());
            Some(PostRecord {
                post: m.into(),
                author,
                category,
            })
        })
        .collect())
}

/// Attach authors (and, for moderation views, posts) to comment rows.
async fn hydrate_comments(
    db: &DbConn,
    models: Vec<comment::Model>,
    with_posts: bool,
) -> Result<Vec<CommentRecord>, RepoError> {
    let author_ids: HashSet<Uuid> = models.iter().map(|m| m.user_id).collect();
    let authors = users_by_id(db, author_ids).await?;

    let posts = if with_posts {
        let post_ids: HashSet<Uuid> = models.iter().map(|m| m.post_id).collect();
        posts_by_id(db, post_ids).await?
    } else {
        HashMap::new()
    };

    Ok(models
        .into_iter()
        .filter_map(|m| {
            let author = authors.get(&m.user_id).cloned()?;
            let post = with_posts.then(|| posts.get(&m.post_id).cloned()).flatten();
            Some(CommentRecord {
                comment: m.into(),
                author,
                post,
            })
        })
        .collect())
}

/// Case-insensitive substring match over title or excerpt.
fn search_condition(term: &str) -> Condition {
    let pattern = format!("%{}%", term.to_lowercase());
    Condition::any()
        .add(
            Expr::expr(Func::lower(Expr::col((PostEntity, post::Column::Title))))
                .like(pattern.clone()),
        )
        .add(Expr::expr(Func::lower(Expr::col((PostEntity, post::Column::Excerpt)))).like(pattern))
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        // Mask email for logging to avoid PII in logs
        let masked = if let Some(at_pos) = email.find('@') {
            let (local, domain) = email.split_at(at_pos);
            let masked_local = if local.len() > 1 {
                format!("{}***", &local[..1])
            } else {
                "***".to_string()
            };
            format!("{}{}", masked_local, domain)
        } else {
            "***".to_string()
        };
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_record(&self, id: Uuid) -> Result<Option<PostRecord>, RepoError> {
        let model = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        let Some(model) = model else {
            return Ok(None);
        };

        Ok(hydrate_posts(&self.db, vec![model]).await?.pop())
    }

    async fn list(&self, query: &PostQuery) -> Result<Page<PostRecord>, RepoError> {
        let mut select = PostEntity::find();

        if let Some(author_id) = query.author_id {
            select = select.filter(post::Column::AuthorId.eq(author_id));
        }
        if let Some(status) = query.status {
            select = select.filter(post::Column::Status.eq(post::PostStatus::from(status)));
        }
        if let Some(term) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            select = select.filter(search_condition(term));
        }

        let select = select.order_by_desc(post::Column::CreatedAt);

        let per_page = query.per_page.max(1);
        let page = query.page.max(1);
        let paginator = select.paginate(&self.db, per_page);
        let total = paginator.num_items().await.map_err(map_db_err)?;
        let models = paginator.fetch_page(page - 1).await.map_err(map_db_err)?;

        Ok(Page {
            items: hydrate_posts(&self.db, models).await?,
            total,
            page,
            per_page,
        })
    }

    async fn list_published(
        &self,
        category_id: Option<Uuid>,
        page: u64,
        per_page: u64,
    ) -> Result<Page<PostRecord>, RepoError> {
        let mut select = PostEntity::find()
            .filter(post::Column::Status.eq(post::PostStatus::Published));

        if let Some(category_id) = category_id {
            select = select.filter(post::Column::CategoryId.eq(category_id));
        }

        let select = select.order_by_desc(post::Column::PublishedAt);

        let per_page = per_page.max(1);
        let page = page.max(1);
        let paginator = select.paginate(&self.db, per_page);
        let total = paginator.num_items().await.map_err(map_db_err)?;
        let models = paginator.fetch_page(page - 1).await.map_err(map_db_err)?;

        Ok(Page {
            items: hydrate_posts(&self.db, models).await?,
            total,
            page,
            per_page,
        })
    }

    async fn related(
        &self,
        category_id: Option<Uuid>,
        exclude_id: Uuid,
        limit: u64,
    ) -> Result<Vec<PostRecord>, RepoError> {
        let Some(category_id) = category_id else {
            return Ok(Vec::new());
        };

        let models = PostEntity::find()
            .filter(post::Column::Status.eq(post::PostStatus::Published))
            .filter(post::Column::CategoryId.eq(category_id))
            .filter(post::Column::Id.ne(exclude_id))
            .order_by_desc(post::Column::PublishedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        hydrate_posts(&self.db, models).await
    }

    async fn latest_published(&self) -> Result<Option<PostRecord>, RepoError> {
        let model = PostEntity::find()
            .filter(post::Column::Status.eq(post::PostStatus::Published))
            .order_by_desc(post::Column::PublishedAt)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        let Some(model) = model else {
            return Ok(None);
        };

        Ok(hydrate_posts(&self.db, vec![model]).await?.pop())
    }

    async fn recent(&self, author_id: Option<Uuid>, limit: u64) -> Result<Vec<Post>, RepoError> {
        let mut select = PostEntity::find();

        if let Some(author_id) = author_id {
            select = select.filter(post::Column::AuthorId.eq(author_id));
        }

        let models = select
            .order_by_desc(post::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count(
        &self,
        author_id: Option<Uuid>,
        status: Option<PostStatus>,
    ) -> Result<u64, RepoError> {
        let mut select = PostEntity::find();

        if let Some(author_id) = author_id {
            select = select.filter(post::Column::AuthorId.eq(author_id));
        }
        if let Some(status) = status {
            select = select.filter(post::Column::Status.eq(post::PostStatus::from(status)));
        }

        select.count(&self.db).await.map_err(map_db_err)
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = CategoryEntity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn list_all(&self) -> Result<Vec<Category>, RepoError> {
        let models = CategoryEntity::find()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn list_with_posts(&self) -> Result<Vec<Category>, RepoError> {
        let models = CategoryEntity::find()
            .inner_join(PostEntity)
            .distinct()
            .order_by_asc(category::Column::Name)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn exists(&self, id: Uuid) -> Result<bool, RepoError> {
        let count = CategoryEntity::find_by_id(id)
            .count(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(count > 0)
    }

    async fn count(&self) -> Result<u64, RepoError> {
        CategoryEntity::find().count(&self.db).await.map_err(map_db_err)
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn list(&self, query: &CommentQuery) -> Result<Page<CommentRecord>, RepoError> {
        let mut select = CommentEntity::find();

        if let Some(status) = query.status {
            select = select.filter(comment::Column::Status.eq(comment::CommentStatus::from(status)));
        }

        let select = select.order_by_desc(comment::Column::CreatedAt);

        let per_page = query.per_page.max(1);
        let page = query.page.max(1);
        let paginator = select.paginate(&self.db, per_page);
        let total = paginator.num_items().await.map_err(map_db_err)?;
        let models = paginator.fetch_page(page - 1).await.map_err(map_db_err)?;

        Ok(Page {
            items: hydrate_comments(&self.db, models, true).await?,
            total,
            page,
            per_page,
        })
    }

    async fn list_for_post(
        &self,
        post_id: Uuid,
        status: Option<CommentStatus>,
    ) -> Result<Vec<CommentRecord>, RepoError> {
        let mut select = CommentEntity::find().filter(comment::Column::PostId.eq(post_id));

        if let Some(status) = status {
            select = select.filter(comment::Column::Status.eq(comment::CommentStatus::from(status)));
        }

        let models = select
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        hydrate_comments(&self.db, models, false).await
    }

    async fn count(&self, status: Option<CommentStatus>) -> Result<u64, RepoError> {
        let mut select = CommentEntity::find();

        if let Some(status) = status {
            select = select.filter(comment::Column::Status.eq(comment::CommentStatus::from(status)));
        }

        select.count(&self.db).await.map_err(map_db_err)
    }

    async fn count_for_post(
        &self,
        post_id: Uuid,
        status: Option<CommentStatus>,
    ) -> Result<u64, RepoError> {
        let mut select = CommentEntity::find().filter(comment::Column::PostId.eq(post_id));

        if let Some(status) = status {
            select = select.filter(comment::Column::Status.eq(comment::CommentStatus::from(status)));
        }

        select.count(&self.db).await.map_err(map_db_err)
    }
}
