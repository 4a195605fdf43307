// src/store/mod.rs

pub mod memory;
pub mod postgres;
pub mod retry;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentsResult, NewComment},
        pagination::Pagination,
    },
};

pub use memory::MemoryCommentStore;
pub use postgres::PgCommentStore;

/// Persistence contract for comments.
///
/// Implementations enforce no business rules: parent checks and the
/// "already deleted" rejection live in the service layer.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// Inserts a new active comment and returns its id.
    async fn create(&self, comment: &NewComment) -> Result<i64, AppError>;

    /// Returns the comment whether or not it is soft-deleted.
    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>, AppError>;

    /// Active descendants of `root_id`, level relative to the root, ordered by
    /// level and then by creation time in the requested direction.
    /// The root itself is never part of the result.
    async fn get_descendants(
        &self,
        root_id: i64,
        pagination: &Pagination,
    ) -> Result<CommentsResult, AppError>;

    /// Active comments without a parent, optionally filtered by a
    /// case-insensitive substring of their content.
    async fn get_roots(&self, pagination: &Pagination) -> Result<CommentsResult, AppError>;

    /// Marks the comment as deleted. Deleting twice keeps the first timestamp.
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}
