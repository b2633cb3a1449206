//! Application state - shared across all handlers.

use std::sync::Arc;

use sea_orm::DbErr;

use quill_core::ports::{CategoryRepository, CommentRepository, PostRepository, UserRepository};
use quill_infra::database::{
    DatabaseConfig, DatabaseConnection, PostgresCategoryRepository, PostgresCommentRepository,
    PostgresPostRepository, PostgresUserRepository,
};

/// Shared application state: one repository handle per entity.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl AppState {
    /// Connect to the database and wire up the Postgres repositories.
    pub async fn init(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let db = DatabaseConnection::init(config).await?;
        let conn = db.conn;

        tracing::info!("Application state initialized");

        Ok(Self {
            users: Arc::new(PostgresUserRepository::new(conn.clone())),
            posts: Arc::new(PostgresPostRepository::new(conn.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(conn.clone())),
            comments: Arc::new(PostgresCommentRepository::new(conn)),
        })
    }
}
