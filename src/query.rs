//! Listing parameters.
//!
//! [`SearchQuery`] is validated when it is built, so the store never sees a
//! zero page or an unbounded limit. Out-of-range values are rejected rather
//! than clamped: a caller asking for page 0 has a bug worth surfacing.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Largest accepted page size.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Ordering of listed records by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Most recently created first. (default)
    #[default]
    Newest,
    /// Oldest first.
    Oldest,
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(SortOrder::Newest),
            "oldest" => Ok(SortOrder::Oldest),
            _ => Err(ValidationError::InvalidSortOrder(s.to_string())),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Newest => f.write_str("newest"),
            SortOrder::Oldest => f.write_str("oldest"),
        }
    }
}

/// A validated page request: 1-indexed `page`, `limit` in `1..=MAX_PAGE_LIMIT`,
/// optional case-insensitive substring filter and a sort order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    page: u32,
    limit: u32,
    search_term: Option<String>,
    sort_order: SortOrder,
}

impl SearchQuery {
    /// Create a query for `page` (1-indexed) of `limit` records, newest first,
    /// with no filter.
    pub fn new(page: u32, limit: u32) -> Result<Self, ValidationError> {
        if page == 0 {
            return Err(ValidationError::InvalidPagination(
                "page is 1-indexed and must be ≥ 1".into(),
            ));
        }
        if limit == 0 || limit > MAX_PAGE_LIMIT {
            return Err(ValidationError::InvalidPagination(format!(
                "limit must be 1–{MAX_PAGE_LIMIT}, got {limit}"
            )));
        }
        Ok(Self {
            page,
            limit,
            search_term: None,
            sort_order: SortOrder::default(),
        })
    }

    /// Restrict results to records whose text contains `term`, ignoring case.
    /// An empty or whitespace-only term matches everything.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into();
        self.search_term = if term.trim().is_empty() {
            None
        } else {
            Some(term)
        };
        self
    }

    pub fn sort(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search_term.as_deref()
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Number of records to skip: `(page - 1) * limit`.
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            search_term: None,
            sort_order: SortOrder::Newest,
        }
    }
}
