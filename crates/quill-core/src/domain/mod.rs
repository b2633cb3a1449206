//! Domain entities - the core business objects.

mod category;
mod comment;
mod post;
mod slug;
mod user;

pub use category::Category;
pub use comment::{Comment, CommentStatus};
pub use post::{Post, PostContent, PostStatus};
pub use slug::slugify;
pub use user::{Role, User};
