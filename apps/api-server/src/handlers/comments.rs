//! Comment creation and moderation.

use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use quill_core::domain::{Comment, CommentStatus};
use quill_core::policy;
use quill_core::ports::CommentQuery;
use quill_shared::ApiResponse;
use quill_shared::dto::{CommentFilters, CommentListView, CommentPayload, CommentStatusPayload};
use quill_shared::response::FieldError;

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Page size of the moderation listing.
const PER_PAGE: u64 = 15;

#[derive(Debug, Deserialize)]
pub struct IndexQuery {
    pub status: Option<String>,
    pub page: Option<u64>,
}

/// GET /comments - the moderation queue, admin only.
pub async fn index(
    state: web::Data<AppState>,
    identity: Identity,
    query: web::Query<IndexQuery>,
) -> AppResult<HttpResponse> {
    if !policy::can_moderate_comments(&identity.actor()) {
        return Err(AppError::Forbidden);
    }

    let query = query.into_inner();
    let status = match query.status.as_deref() {
        None | Some("all") => None,
        Some(value) => Some(value.parse::<CommentStatus>().map_err(|_| {
            AppError::Validation(vec![FieldError::new(
                "status",
                "Status filter must be pending, approved, rejected, or all.",
            )])
        })?),
    };

    let comments = state
        .comments
        .list(&CommentQuery {
            status,
            page: query.page.unwrap_or(1),
            per_page: PER_PAGE,
        })
        .await?;

    Ok(HttpResponse::Ok().json(CommentListView {
        comments: comments.into(),
        filters: CommentFilters {
            status: query.status,
        },
    }))
}

/// POST /comments - any authenticated user; the stored comment is always
/// pending, whatever the client sent.
pub async fn store(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CommentPayload>,
) -> AppResult<HttpResponse> {
    let payload = body.into_inner();

    let mut errors = payload.validate();
    if state.posts.find_by_id(payload.post_id).await?.is_none() {
        errors.push(FieldError::new("post_id", "Selected post does not exist."));
    }
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    state
        .comments
        .insert(Comment::new(payload.post_id, identity.user_id, payload.content))
        .await?;

    Ok(HttpResponse::Created().json(ApiResponse::message(
        "Comment submitted successfully. It will be visible after approval.",
    )))
}

/// PUT /comments/{id} - status transition, admin only. Repeating the same
/// transition is a no-op.
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<CommentStatusPayload>,
) -> AppResult<HttpResponse> {
    if !policy::can_moderate_comments(&identity.actor()) {
        return Err(AppError::Forbidden);
    }

    let status = body
        .parse()
        .map_err(|e| AppError::Validation(vec![e]))?;

    let mut comment = state
        .comments
        .find_by_id(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    comment.set_status(status);
    state.comments.update(comment).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message(
        "Comment status updated successfully.",
    )))
}

/// DELETE /comments/{id} - the comment's author or an admin.
pub async fn destroy(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let actor = identity.actor();
    let id = path.into_inner();

    let comment = state
        .comments
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Comment not found".to_string()))?;

    if !policy::can_delete_comment(&actor, &comment) {
        return Err(AppError::Forbidden);
    }

    state.comments.delete(id).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::message("Comment deleted successfully.")))
}
