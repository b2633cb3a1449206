//! Public blog handlers - no authentication required.

use actix_web::{HttpResponse, web};
use serde::Deserialize;

use quill_core::domain::CommentStatus;
use quill_shared::dto::{BlogIndexView, BlogShowView, CategoryBlogView};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Page size of the home listing.
const HOME_PER_PAGE: u64 = 6;

/// Page size of a category listing.
const CATEGORY_PER_PAGE: u64 = 9;

/// Number of related posts shown under a post.
const RELATED_LIMIT: u64 = 3;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
}

/// GET / - the blog home page: published posts, category navigation, and
/// the featured (latest published) post.
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let page = query.page.unwrap_or(1);

    let posts = state.posts.list_published(None, page, HOME_PER_PAGE).await?;
    let categories = state.categories.list_with_posts().await?;
    let featured = state.posts.latest_published().await?;

    Ok(HttpResponse::Ok().json(BlogIndexView {
        posts: posts.into(),
        categories: categories.into_iter().map(Into::into).collect(),
        featured_post: featured.map(Into::into),
    }))
}

/// GET /blog/{slug} - public post detail.
///
/// Drafts are reported as missing, not forbidden: status hides existence.
pub async fn show(state: web::Data<AppState>, path: web::Path<String>) -> AppResult<HttpResponse> {
    let slug = path.into_inner();

    let post = state
        .posts
        .find_by_slug(&slug)
        .await?
        .filter(|p| p.is_published())
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let record = state
        .posts
        .find_record(post.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let comments = state
        .comments
        .list_for_post(post.id, Some(CommentStatus::Approved))
        .await?;

    let related = state
        .posts
        .related(record.post.category_id, post.id, RELATED_LIMIT)
        .await?;

    let comment_count = comments.len() as u64;

    Ok(HttpResponse::Ok().json(BlogShowView {
        post: record.into(),
        comments: comments.into_iter().map(Into::into).collect(),
        comment_count,
        related_posts: related.into_iter().map(Into::into).collect(),
    }))
}

/// GET /category/{slug} - published posts in one category.
pub async fn category(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();

    let category = state
        .categories
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    let posts = state
        .posts
        .list_published(Some(category.id), query.page.unwrap_or(1), CATEGORY_PER_PAGE)
        .await?;

    Ok(HttpResponse::Ok().json(CategoryBlogView {
        category: category.into(),
        posts: posts.into(),
    }))
}
