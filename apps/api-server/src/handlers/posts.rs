//! Dashboard post management - CRUD gated by ownership or admin role.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use quill_core::domain::{Post, PostContent, PostStatus};
use quill_core::policy::{self, Actor};
use quill_core::ports::PostQuery;
use quill_shared::ApiResponse;
use quill_shared::dto::{
    PostDetail, PostEditView, PostFilters, PostListView, PostPayload, PostShowView,
};
use quill_shared::response::FieldError;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Page size of the dashboard listing.
const PER_PAGE: u64 = 10;

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<u64>,
}

/// Resolve an optional status filter; `all` and absence mean no filter.
fn status_filter(raw: Option<&str>) -> Result<Option<PostStatus>, AppError> {
    match raw {
        None | Some("all") => Ok(None),
        Some(value) => value.parse::<PostStatus>().map(Some).map_err(|_| {
            AppError::Validation(vec![FieldError::new(
                "status",
                "Status filter must be draft, published, or all.",
            )])
        }),
    }
}

/// Validate a payload and resolve it into domain post content. Category
/// existence is checked against the store.
async fn validated_content(
    state: &AppState,
    payload: &PostPayload,
) -> Result<PostContent, AppError> {
    let mut errors = payload.validate();

    if let Some(category_id) = payload.category_id {
        if !state.categories.exists(category_id).await? {
            errors.push(FieldError::new(
                "category_id",
                "Selected category does not exist.",
            ));
        }
    }

    // A bad status string is already reported by validate()
    match (payload.status.parse::<PostStatus>(), errors.is_empty()) {
        (Ok(status), true) => Ok(PostContent {
            title: payload.title.clone(),
            excerpt: payload.excerpt.clone(),
            content: payload.content.clone(),
            status,
            category_id: payload.category_id,
        }),
        _ => Err(AppError::Validation(errors)),
    }
}

/// Load a post and enforce the ownership/admin policy on it.
async fn managed_post(state: &AppState, actor: &Actor, id: Uuid) -> Result<Post, AppError> {
    let post = state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if !policy::can_manage_post(actor, &post) {
        return Err(AppError::Forbidden);
    }

    Ok(post)
}

/// GET /posts - listing scoped to the actor's own posts unless admin,
/// with optional status filter and title/excerpt search.
pub async fn index(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<IndexQuery>,
) -> AppResult<HttpResponse> {
    let actor = identity.actor();
    let query = query.into_inner();

    let posts = state
        .posts
        .list(&PostQuery {
            author_id: (!actor.is_admin()).then_some(actor.id),
            status: status_filter(query.status.as_deref())?,
            search: query.search.clone(),
            page: query.page.unwrap_or(1),
            per_page: PER_PAGE,
        })
        .await?;

    Ok(HttpResponse::Ok().json(PostListView {
        posts: posts.into(),
        filters: PostFilters {
            status: query.status,
            search: query.search,
        },
    }))
}

/// POST /posts - any authenticated user may create; the actor becomes the
/// author and `slug`/`published_at` are derived server-side.
pub async fn store(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostPayload>,
) -> AppResult<HttpResponse> {
    let actor = identity.actor();
    let content = validated_content(&state, &body).await?;

    let post = state.posts.insert(Post::new(actor.id, content)).await?;

    let record = state
        .posts
        .find_record(post.id)
        .await?
        .ok_or_else(|| AppError::Internal("post vanished after insert".to_string()))?;

    Ok(HttpResponse::Created().json(ApiResponse::ok_with_message(
        PostDetail::from(record),
        "Post created successfully.",
    )))
}

/// GET /posts/{id} - dashboard detail with every comment, whatever its
/// moderation status.
pub async fn show(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let actor = identity.actor();
    let id = path.into_inner();

    managed_post(&state, &actor, id).await?;

    let record = state
        .posts
        .find_record(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let comments = state.comments.list_for_post(id, None).await?;

    Ok(HttpResponse::Ok().json(PostShowView {
        post: record.into(),
        comments: comments.into_iter().map(Into::into).collect(),
    }))
}

/// GET /posts/{id}/edit - the post plus the category list for the form.
pub async fn edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let actor = identity.actor();
    let id = path.into_inner();

    managed_post(&state, &actor, id).await?;

    let record = state
        .posts
        .find_record(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let categories = state.categories.list_all().await?;

    Ok(HttpResponse::Ok().json(PostEditView {
        post: record.into(),
        categories: categories.into_iter().map(Into::into).collect(),
    }))
}

/// PUT /posts/{id} - re-derives `slug` and `published_at` from the payload.
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostPayload>,
) -> AppResult<HttpResponse> {
    let actor = identity.actor();
    let id = path.into_inner();

    let mut post = managed_post(&state, &actor, id).await?;
    let content = validated_content(&state, &body).await?;

    post.apply(content);
    let post = state.posts.update(post).await?;

    let record = state
        .posts
        .find_record(post.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
        PostDetail::from(record),
        "Post updated successfully.",
    )))
}

/// DELETE /posts/{id} - hard delete.
pub async fn destroy(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let actor = identity.actor();
    let id = path.into_inner();

    managed_post(&state, &actor, id).await?;
    state.posts.delete(id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Post deleted successfully.")))
}
