// src/models/pagination.rs

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::error::AppError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// Secondary ordering of a page; the primary key is always the tree level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    CreatedAtAsc,
    CreatedAtDesc,
}

impl SortOrder {
    /// SQL direction keyword. Only ever one of two literals, so it is safe
    /// to splice into a query.
    pub fn sql(self) -> &'static str {
        match self {
            SortOrder::CreatedAtAsc => "ASC",
            SortOrder::CreatedAtDesc => "DESC",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::CreatedAtAsc => "created_at_asc",
            SortOrder::CreatedAtDesc => "created_at_desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at_asc" => Ok(SortOrder::CreatedAtAsc),
            "created_at_desc" => Ok(SortOrder::CreatedAtDesc),
            other => Err(AppError::Validation(format!(
                "sort must be 'created_at_asc' or 'created_at_desc', got '{}'",
                other
            ))),
        }
    }
}

/// Pagination as supplied by a caller: every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PaginationParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<SortOrder>,
    pub search: Option<String>,
}

/// Pagination after defaults have been applied. Stores only ever see this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub sort: SortOrder,
    pub search: Option<String>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
            sort: SortOrder::default(),
            search: None,
        }
    }
}

impl Pagination {
    /// Applies defaults to anything unset, zero, negative or empty.
    /// `limit` is additionally capped at `MAX_LIMIT`.
    pub fn normalize(params: Option<PaginationParams>) -> Self {
        let Some(params) = params else {
            return Self::default();
        };

        let page = params.page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE);
        let limit = params
            .limit
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);
        let search = params
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            page,
            limit,
            sort: params.sort.unwrap_or_default(),
            search,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_params_use_defaults() {
        let pag = Pagination::normalize(None);
        assert_eq!(
            pag,
            Pagination {
                page: 1,
                limit: 20,
                sort: SortOrder::CreatedAtAsc,
                search: None,
            }
        );
        assert_eq!(pag, Pagination::normalize(Some(PaginationParams::default())));
    }

    #[test]
    fn zero_and_negative_fields_fall_back() {
        let pag = Pagination::normalize(Some(PaginationParams {
            page: Some(0),
            limit: Some(-5),
            sort: Some(SortOrder::CreatedAtDesc),
            search: Some("   ".to_string()),
        }));
        assert_eq!(pag.page, 1);
        assert_eq!(pag.limit, 20);
        assert_eq!(pag.sort, SortOrder::CreatedAtDesc);
        assert_eq!(pag.search, None);
    }

    #[test]
    fn limit_is_capped_and_offset_computed() {
        let pag = Pagination::normalize(Some(PaginationParams {
            page: Some(3),
            limit: Some(500),
            ..Default::default()
        }));
        assert_eq!(pag.limit, MAX_LIMIT);
        assert_eq!(pag.offset(), 200);
    }

    #[test]
    fn sort_order_parses_known_values_only() {
        assert_eq!("created_at_desc".parse::<SortOrder>().unwrap(), SortOrder::CreatedAtDesc);
        assert_eq!(SortOrder::CreatedAtAsc.to_string(), "created_at_asc");
        assert!(matches!(
            "newest".parse::<SortOrder>(),
            Err(AppError::Validation(_))
        ));
    }
}
