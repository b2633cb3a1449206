//! Role-scoped dashboard: statistics and recent posts.

use actix_web::{HttpResponse, web};

use quill_core::domain::{CommentStatus, PostStatus};
use quill_shared::dto::{DashboardStats, DashboardView, RecentPost};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// Number of recent posts shown on the dashboard.
const RECENT_LIMIT: u64 = 5;

/// GET /dashboard
///
/// Admins see platform-wide numbers; authors see only their own posts and
/// zeroes for the moderation counters.
pub async fn index(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let actor = identity.actor();
    let author_scope = (!actor.is_admin()).then_some(actor.id);

    let mut stats = DashboardStats {
        total_posts: state.posts.count(author_scope, None).await?,
        published_posts: state
            .posts
            .count(author_scope, Some(PostStatus::Published))
            .await?,
        draft_posts: state
            .posts
            .count(author_scope, Some(PostStatus::Draft))
            .await?,
        ..DashboardStats::default()
    };

    if actor.is_admin() {
        stats.total_comments = state.comments.count(None).await?;
        stats.pending_comments = state.comments.count(Some(CommentStatus::Pending)).await?;
        stats.total_categories = state.categories.count().await?;
    }

    let recent = state.posts.recent(author_scope, RECENT_LIMIT).await?;

    let mut recent_posts = Vec::with_capacity(recent.len());
    for post in recent {
        let comments_count = state.comments.count_for_post(post.id, None).await?;
        recent_posts.push(RecentPost {
            id: post.id,
            title: post.title,
            status: post.status,
            created_at: post.created_at,
            comments_count,
        });
    }

    Ok(HttpResponse::Ok().json(DashboardView {
        stats,
        recent_posts,
    }))
}
