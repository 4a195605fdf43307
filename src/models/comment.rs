use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Represents the 'comments' table in the database.
///
/// `level` is not stored: it is the distance from the root of the fetch that
/// produced this row, so the same comment can carry different levels in
/// different queries.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub content: String,
    pub author: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<chrono::DateTime<chrono::Utc>>,
    #[sqlx(default)]
    pub level: i32,
}

impl Comment {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Write model for a comment that does not exist yet.
#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct NewComment {
    /// Optional: the ID of the comment being replied to.
    pub parent_id: Option<i64>,

    #[validate(
        length(
            min = 1,
            max = 1000,
            message = "Comment must be between 1 and 1000 characters"
        ),
        custom(function = not_blank, message = "Comment must not be blank")
    )]
    pub content: String,

    #[validate(
        length(
            min = 1,
            max = 50,
            message = "Author must be between 1 and 50 characters"
        ),
        custom(function = not_blank, message = "Author must not be blank")
    )]
    pub author: String,
}

impl NewComment {
    pub fn new(parent_id: Option<i64>, content: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            parent_id,
            content: content.into(),
            author: author.into(),
        }
    }

    /// Strips surrounding whitespace; length limits apply to the trimmed text.
    pub fn trimmed(self) -> Self {
        Self {
            parent_id: self.parent_id,
            content: self.content.trim().to_string(),
            author: self.author.trim().to_string(),
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// One page of comments plus the numbers needed to render a pager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentsResult {
    pub comments: Vec<Comment>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
}

impl CommentsResult {
    pub fn new(comments: Vec<Comment>, total: i64, page: i64, limit: i64) -> Self {
        Self {
            comments,
            total,
            page,
            limit,
            pages: page_count(total, limit),
        }
    }
}

/// `ceil(total / limit)`, with a non-positive limit yielding zero pages.
pub fn page_count(total: i64, limit: i64) -> i64 {
    if limit <= 0 || total <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}
