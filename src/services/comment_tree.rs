// src/services/comment_tree.rs

use std::sync::Arc;

use validator::Validate;

use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentsResult, NewComment},
        pagination::{Pagination, PaginationParams},
    },
    store::CommentStore,
};

/// Business rules for the comment tree, on top of any `CommentStore`.
///
/// Checks and writes are separate statements with no surrounding
/// transaction: a parent deleted between the check and the insert still
/// gets the reply.
#[derive(Clone)]
pub struct CommentTreeService {
    store: Arc<dyn CommentStore>,
}

impl CommentTreeService {
    pub fn new(store: Arc<dyn CommentStore>) -> Self {
        Self { store }
    }

    /// Validates and stores a comment, returning its id.
    /// A reply requires an existing, non-deleted parent.
    pub async fn write_comment(&self, comment: NewComment) -> Result<i64, AppError> {
        let comment = comment.trimmed();
        comment.validate()?;

        if let Some(parent_id) = comment.parent_id {
            let parent = self
                .store
                .get_by_id(parent_id)
                .await?
                .ok_or_else(|| AppError::parent_not_found(parent_id))?;

            if parent.is_deleted() {
                return Err(AppError::parent_deleted(parent_id));
            }
        }

        let id = self.store.create(&comment).await?;
        tracing::info!("Comment {} written (parent: {:?})", id, comment.parent_id);
        Ok(id)
    }

    /// Single comment, including soft-deleted ones.
    pub async fn get_comment(&self, id: i64) -> Result<Comment, AppError> {
        self.store
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::comment_not_found(id))
    }

    /// Replies under `parent_id`, all levels deep.
    ///
    /// A deleted parent does not block the listing: its replies are
    /// independent comments and stay readable.
    pub async fn get_comments(
        &self,
        parent_id: i64,
        pagination: Option<PaginationParams>,
    ) -> Result<CommentsResult, AppError> {
        self.store
            .get_by_id(parent_id)
            .await?
            .ok_or_else(|| AppError::comment_not_found(parent_id))?;

        let pagination = Pagination::normalize(pagination);
        self.store.get_descendants(parent_id, &pagination).await
    }

    pub async fn get_root_comments(
        &self,
        pagination: Option<PaginationParams>,
    ) -> Result<CommentsResult, AppError> {
        let pagination = Pagination::normalize(pagination);
        self.store.get_roots(&pagination).await
    }

    /// Soft-deletes a comment. `Active -> Deleted` is the only transition.
    pub async fn delete_comment(&self, id: i64) -> Result<(), AppError> {
        let comment = self.get_comment(id).await?;
        if comment.is_deleted() {
            return Err(AppError::comment_deleted(id));
        }

        self.store.delete(id).await?;
        tracing::info!("Comment {} deleted", id);
        Ok(())
    }
}
