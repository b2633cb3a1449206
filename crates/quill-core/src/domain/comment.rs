use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Moderation state of a comment. Only approved comments are publicly
/// visible; transitions are free in both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommentStatus {
    Pending,
    Approved,
    Rejected,
}

impl CommentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentStatus::Pending => "pending",
            CommentStatus::Approved => "approved",
            CommentStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(CommentStatus::Pending),
            "approved" => Ok(CommentStatus::Approved),
            "rejected" => Ok(CommentStatus::Rejected),
            other => Err(format!("unknown comment status: {other}")),
        }
    }
}

/// Comment entity - attached to a post by an authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub status: CommentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    /// Create a new comment. Always starts pending, whatever the client sent.
    pub fn new(post_id: Uuid, user_id: Uuid, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            post_id,
            user_id,
            content,
            status: CommentStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the moderation status. Idempotent for repeated identical updates.
    pub fn set_status(&mut self, status: CommentStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_comments_are_always_pending() {
        let comment = Comment::new(Uuid::new_v4(), Uuid::new_v4(), "First!".to_owned());
        assert_eq!(comment.status, CommentStatus::Pending);
    }

    #[test]
    fn status_update_is_idempotent() {
        let mut comment = Comment::new(Uuid::new_v4(), Uuid::new_v4(), "hi".to_owned());

        comment.set_status(CommentStatus::Approved);
        let first = comment.status;
        comment.set_status(CommentStatus::Approved);

        assert_eq!(comment.status, first);
        assert_eq!(comment.status, CommentStatus::Approved);
    }

    #[test]
    fn moderation_can_move_back_to_pending() {
        let mut comment = Comment::new(Uuid::new_v4(), Uuid::new_v4(), "hi".to_owned());
        comment.set_status(CommentStatus::Rejected);
        comment.set_status(CommentStatus::Pending);
        assert_eq!(comment.status, CommentStatus::Pending);
    }
}
