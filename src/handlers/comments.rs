// src/handlers/comments.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    models::{
        comment::NewComment,
        pagination::{PaginationParams, SortOrder},
    },
    services::CommentTreeService,
};

/// Body of `POST /comments`.
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    /// Optional: the ID of the comment being replied to.
    pub parent_id: Option<i64>,
    pub content: String,
    pub author: String,
}

/// Query parameters for listing comments.
#[derive(Debug, Default, Deserialize)]
pub struct ListCommentsQuery {
    /// Parent comment; absent or 0 lists root comments.
    pub parent: Option<i64>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// 'created_at_asc' (default) or 'created_at_desc'.
    pub sort: Option<String>,
    /// Substring match on content, root comments only.
    pub search: Option<String>,
}

impl ListCommentsQuery {
    /// `None` when the client sent no pagination parameter at all.
    fn pagination(&self) -> Result<Option<PaginationParams>, AppError> {
        if self.page.is_none()
            && self.limit.is_none()
            && self.sort.is_none()
            && self.search.is_none()
        {
            return Ok(None);
        }

        let sort = match self.sort.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<SortOrder>()?),
        };

        Ok(Some(PaginationParams {
            page: self.page,
            limit: self.limit,
            sort,
            search: self.search.clone(),
        }))
    }
}

fn ensure_positive_id(id: i64, what: &str) -> Result<i64, AppError> {
    if id < 1 {
        return Err(AppError::Validation(format!("{} must be greater than 0", what)));
    }
    Ok(id)
}

/// Create a new comment, optionally as a reply.
pub async fn create_comment(
    State(service): State<CommentTreeService>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(parent_id) = payload.parent_id {
        ensure_positive_id(parent_id, "parent_id")?;
    }

    // Stored verbatim; the UI renders content as text, never as HTML.
    let comment = NewComment::new(payload.parent_id, payload.content, payload.author);
    let id = service.write_comment(comment).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": id })),
    ))
}

/// List root comments, or the reply tree under `parent`.
pub async fn list_comments(
    State(service): State<CommentTreeService>,
    Query(params): Query<ListCommentsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let pagination = params.pagination()?;

    let result = match params.parent {
        None | Some(0) => service.get_root_comments(pagination).await?,
        Some(parent) => {
            let parent = ensure_positive_id(parent, "parent")?;
            service.get_comments(parent, pagination).await?
        }
    };

    Ok(Json(result))
}

/// Get a single comment by ID.
pub async fn get_comment(
    State(service): State<CommentTreeService>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let id = ensure_positive_id(id, "id")?;
    let comment = service.get_comment(id).await?;
    Ok(Json(comment))
}

/// Delete a comment (Soft Delete).
pub async fn delete_comment(
    State(service): State<CommentTreeService>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let id = ensure_positive_id(id, "id")?;
    service.delete_comment(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_query_parameters_means_no_pagination() {
        let query = ListCommentsQuery {
            parent: Some(3),
            ..Default::default()
        };
        assert_eq!(query.pagination().unwrap(), None);
    }

    #[test]
    fn empty_sort_is_treated_as_unset() {
        let query = ListCommentsQuery {
            page: Some(2),
            sort: Some(String::new()),
            ..Default::default()
        };
        let pagination = query.pagination().unwrap().unwrap();
        assert_eq!(pagination.page, Some(2));
        assert_eq!(pagination.sort, None);
    }

    #[test]
    fn unknown_sort_is_rejected() {
        let query = ListCommentsQuery {
            sort: Some("popular".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.pagination(), Err(AppError::Validation(_))));
    }
}
