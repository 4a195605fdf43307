// src/store/memory.rs

use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap, VecDeque},
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::{
    error::AppError,
    models::{
        comment::{Comment, CommentsResult, NewComment},
        pagination::{Pagination, SortOrder},
    },
    store::CommentStore,
};

/// In-process `CommentStore` keeping an adjacency list next to the rows.
///
/// Used by the test suites and when the service runs with
/// `COMMENT_STORE=memory`. Nothing is persisted across restarts.
#[derive(Default)]
pub struct MemoryCommentStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    last_id: i64,
    rows: BTreeMap<i64, Comment>,
    children: HashMap<i64, Vec<i64>>,
}

impl MemoryCommentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Inner {
    /// Walks the tree under `root_id` level by level. Deleted nodes are
    /// expanded like any other node but left out of the output.
    fn descendants(&self, root_id: i64) -> Vec<Comment> {
        let mut out = Vec::new();
        if !self.rows.contains_key(&root_id) {
            return out;
        }

        let mut queue = VecDeque::from([(root_id, 0)]);
        while let Some((id, level)) = queue.pop_front() {
            if level > 0 {
                if let Some(row) = self.rows.get(&id).filter(|row| !row.is_deleted()) {
                    out.push(Comment {
                        level,
                        ..row.clone()
                    });
                }
            }
            if let Some(children) = self.children.get(&id) {
                queue.extend(children.iter().map(|child| (*child, level + 1)));
            }
        }
        out
    }
}

fn compare(sort: SortOrder, a: &Comment, b: &Comment) -> Ordering {
    let by_time = a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id));
    let by_time = match sort {
        SortOrder::CreatedAtAsc => by_time,
        SortOrder::CreatedAtDesc => by_time.reverse(),
    };
    a.level.cmp(&b.level).then(by_time)
}

/// Sorts the full match set and cuts out the requested page.
fn paginate(mut rows: Vec<Comment>, pagination: &Pagination) -> CommentsResult {
    rows.sort_by(|a, b| compare(pagination.sort, a, b));

    let total = rows.len() as i64;
    let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
    let limit = usize::try_from(pagination.limit).unwrap_or(0);
    let comments = rows.into_iter().skip(offset).take(limit).collect();

    CommentsResult::new(comments, total, pagination.page, pagination.limit)
}

#[async_trait]
impl CommentStore for MemoryCommentStore {
    async fn create(&self, comment: &NewComment) -> Result<i64, AppError> {
        let mut inner = self.inner.write().await;

        if let Some(parent_id) = comment.parent_id {
            if !inner.rows.contains_key(&parent_id) {
                return Err(AppError::Storage(format!(
                    "foreign key violation: parent {} does not exist",
                    parent_id
                )));
            }
        }

        inner.last_id += 1;
        let id = inner.last_id;
        let now = Utc::now();
        inner.rows.insert(
            id,
            Comment {
                id,
                parent_id: comment.parent_id,
                content: comment.content.clone(),
                author: comment.author.clone(),
                created_at: now,
                updated_at: now,
                deleted_at: None,
                level: 0,
            },
        );
        if let Some(parent_id) = comment.parent_id {
            inner.children.entry(parent_id).or_default().push(id);
        }

        Ok(id)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>, AppError> {
        Ok(self.inner.read().await.rows.get(&id).cloned())
    }

    async fn get_descendants(
        &self,
        root_id: i64,
        pagination: &Pagination,
    ) -> Result<CommentsResult, AppError> {
        let rows = self.inner.read().await.descendants(root_id);
        Ok(paginate(rows, pagination))
    }

    async fn get_roots(&self, pagination: &Pagination) -> Result<CommentsResult, AppError> {
        let needle = pagination.search.as_deref().map(str::to_lowercase);
        let rows = self
            .inner
            .read()
            .await
            .rows
            .values()
            .filter(|row| row.parent_id.is_none() && !row.is_deleted())
            .filter(|row| match &needle {
                Some(needle) => row.content.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .cloned()
            .collect();
        Ok(paginate(rows, pagination))
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        if let Some(row) = inner.rows.get_mut(&id) {
            if row.deleted_at.is_none() {
                let now = Utc::now();
                row.deleted_at = Some(now);
                row.updated_at = now;
            }
        }
        Ok(())
    }
}
