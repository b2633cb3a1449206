//! Authorization policy - pure decision functions.
//!
//! Every predicate takes the acting user explicitly; there is no ambient
//! "current user" anywhere in the crate. Denials map to `Forbidden` at the
//! HTTP layer, except public post reads where a draft is reported as if it
//! did not exist.

use uuid::Uuid;

use crate::domain::{Comment, Post, Role};

/// The authenticated user performing a request.
#[derive(Debug, Clone, Copy)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn new(id: Uuid, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Dashboard access to a post (show/edit/update/destroy): the owner or an
/// admin.
pub fn can_manage_post(actor: &Actor, post: &Post) -> bool {
    actor.is_admin() || post.author_id == actor.id
}

/// Comment moderation (listing all comments, changing status): admin only.
pub fn can_moderate_comments(actor: &Actor) -> bool {
    actor.is_admin()
}

/// Comment deletion: the comment's author or an admin.
pub fn can_delete_comment(actor: &Actor, comment: &Comment) -> bool {
    actor.is_admin() || comment.user_id == actor.id
}

/// Category management: admin only.
pub fn can_manage_categories(actor: &Actor) -> bool {
    actor.is_admin()
}
