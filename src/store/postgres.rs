// src/store/postgres.rs

use std::time::Duration;

use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentsResult, NewComment},
        pagination::Pagination,
    },
    store::{
        CommentStore,
        retry::{RetryPolicy, with_retry},
    },
};

const INSERT_COMMENT: &str = r#"
    INSERT INTO comments (parent_id, content, author)
    VALUES ($1, $2, $3)
    RETURNING id
"#;

const SELECT_BY_ID: &str = r#"
    SELECT id, parent_id, content, author, created_at, updated_at, deleted_at, 0 AS level
    FROM comments
    WHERE id = $1
"#;

const SOFT_DELETE: &str = r#"
    UPDATE comments
    SET deleted_at = NOW(), updated_at = NOW()
    WHERE id = $1 AND deleted_at IS NULL
"#;

/// Breadth-first closure over parent links, starting at `$1` with level 0.
/// Deleted rows are still walked so that their active replies stay reachable;
/// they are filtered out by the statements that consume the CTE.
const DESCENDANTS_CTE: &str = r#"
    WITH RECURSIVE comment_tree AS (
        SELECT id, parent_id, content, author, created_at, updated_at, deleted_at, 0 AS level
        FROM comments
        WHERE id = $1

        UNION ALL

        SELECT c.id, c.parent_id, c.content, c.author, c.created_at, c.updated_at, c.deleted_at, ct.level + 1
        FROM comments c
        INNER JOIN comment_tree ct ON c.parent_id = ct.id
    )
"#;

const ROOTS_FILTER: &str = r#"
    FROM comments
    WHERE parent_id IS NULL
      AND deleted_at IS NULL
      AND ($1::TEXT IS NULL OR content ILIKE $1)
"#;

/// Postgres-backed `CommentStore`.
#[derive(Clone)]
pub struct PgCommentStore {
    pool: PgPool,
    retry: RetryPolicy,
}

impl PgCommentStore {
    pub fn new(pool: PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }

    /// Opens a pool, retrying while the database is still starting up.
    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        acquire_timeout: Duration,
    ) -> Result<PgPool, AppError> {
        let mut retry_count = 0;
        loop {
            match PgPoolOptions::new()
                .max_connections(max_connections)
                .acquire_timeout(acquire_timeout)
                .connect(database_url)
                .await
            {
                Ok(pool) => return Ok(pool),
                Err(e) => {
                    retry_count += 1;
                    if retry_count > 5 {
                        return Err(AppError::Storage(format!(
                            "Failed to connect to database after 5 retries: {}",
                            e
                        )));
                    }
                    tracing::warn!(
                        "Database not ready, retrying in 2s... (Attempt {})",
                        retry_count
                    );
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
            }
        }
    }

    /// Applies the bundled schema migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

/// Wraps a search term for `ILIKE`, escaping its wildcards.
fn like_pattern(search: &str) -> String {
    let mut escaped = String::with_capacity(search.len() + 2);
    escaped.push('%');
    for ch in search.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl CommentStore for PgCommentStore {
    async fn create(&self, comment: &NewComment) -> Result<i64, AppError> {
        let pool = &self.pool;
        let id = with_retry(&self.retry, "comments.create", move || {
            sqlx::query_scalar::<_, i64>(INSERT_COMMENT)
                .bind(comment.parent_id)
                .bind(&comment.content)
                .bind(&comment.author)
                .fetch_one(pool)
        })
        .await?;

        tracing::debug!("Created comment {}", id);
        Ok(id)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>, AppError> {
        let pool = &self.pool;
        with_retry(&self.retry, "comments.get_by_id", move || {
            sqlx::query_as::<_, Comment>(SELECT_BY_ID)
                .bind(id)
                .fetch_optional(pool)
        })
        .await
    }

    async fn get_descendants(
        &self,
        root_id: i64,
        pagination: &Pagination,
    ) -> Result<CommentsResult, AppError> {
        let pool = &self.pool;

        let count_sql = format!(
            "{} SELECT COUNT(*) FROM comment_tree WHERE level > 0 AND deleted_at IS NULL",
            DESCENDANTS_CTE
        );
        let count_sql = count_sql.as_str();
        let total = with_retry(&self.retry, "comments.count_descendants", move || {
            sqlx::query_scalar::<_, i64>(count_sql)
                .bind(root_id)
                .fetch_one(pool)
        })
        .await?;

        let direction = pagination.sort.sql();
        let page_sql = format!(
            r#"{}
            SELECT id, parent_id, content, author, created_at, updated_at, deleted_at, level
            FROM comment_tree
            WHERE level > 0 AND deleted_at IS NULL
            ORDER BY level ASC, created_at {dir}, id {dir}
            LIMIT $2 OFFSET $3
            "#,
            DESCENDANTS_CTE,
            dir = direction
        );
        let page_sql = page_sql.as_str();
        let (limit, offset) = (pagination.limit, pagination.offset());
        let comments = with_retry(&self.retry, "comments.get_descendants", move || {
            sqlx::query_as::<_, Comment>(page_sql)
                .bind(root_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
        })
        .await?;

        Ok(CommentsResult::new(
            comments,
            total,
            pagination.page,
            pagination.limit,
        ))
    }

    async fn get_roots(&self, pagination: &Pagination) -> Result<CommentsResult, AppError> {
        let pool = &self.pool;
        let pattern = pagination.search.as_deref().map(like_pattern);
        let pattern = pattern.as_deref();

        let count_sql = format!("SELECT COUNT(*) {}", ROOTS_FILTER);
        let count_sql = count_sql.as_str();
        let total = with_retry(&self.retry, "comments.count_roots", move || {
            sqlx::query_scalar::<_, i64>(count_sql)
                .bind(pattern)
                .fetch_one(pool)
        })
        .await?;

        let page_sql = format!(
            r#"
            SELECT id, parent_id, content, author, created_at, updated_at, deleted_at, 0 AS level
            {}
            ORDER BY created_at {dir}, id {dir}
            LIMIT $2 OFFSET $3
            "#,
            ROOTS_FILTER,
            dir = pagination.sort.sql()
        );
        let page_sql = page_sql.as_str();
        let (limit, offset) = (pagination.limit, pagination.offset());
        let comments = with_retry(&self.retry, "comments.get_roots", move || {
            sqlx::query_as::<_, Comment>(page_sql)
                .bind(pattern)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
        })
        .await?;

        Ok(CommentsResult::new(
            comments,
            total,
            pagination.page,
            pagination.limit,
        ))
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let pool = &self.pool;
        let result = with_retry(&self.retry, "comments.delete", move || {
            sqlx::query(SOFT_DELETE).bind(id).execute(pool)
        })
        .await?;

        tracing::debug!("Soft-deleted comment {} ({} rows)", id, result.rows_affected());
        Ok(())
    }
}
