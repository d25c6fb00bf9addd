//! # Pagination Module
//!
//! A `Pagination` value that can be deserialized from query parameters
//! (`?page=1&limit=20`) and applied to any `QueryBuilder`.
//!
//! ```rust,ignore
//! let page = Pagination::new(0, 10);
//! let bookings: Vec<Booking> = page.apply(db.model::<Booking>()).scan().await?;
//! ```

use serde::{Deserialize, Serialize};
use sqlx::{Any, Executor};

use crate::{model::Model, query_builder::QueryBuilder};

/// Largest page size `apply` will request.
pub const MAX_LIMIT: usize = 100;

/// A standard pagination structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// The page number (0-indexed). Default: 0.
    #[serde(default)]
    pub page: usize,

    /// The number of items per page. Default: 10.
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 0, limit: default_limit() }
    }
}

impl Pagination {
    /// Creates a new Pagination instance.
    pub fn new(page: usize, limit: usize) -> Self {
        Self { page, limit }
    }

    /// The effective page size: `limit` clamped to `1..=MAX_LIMIT`.
    pub fn effective_limit(&self) -> usize {
        self.limit.clamp(1, MAX_LIMIT)
    }

    /// Number of rows skipped before this page.
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.effective_limit())
    }

    /// Applies LIMIT and OFFSET to a query.
    pub fn apply<'a, T, E>(&self, query: QueryBuilder<'a, T, E>) -> QueryBuilder<'a, T, E>
    where
        T: Model + Send + Sync + Unpin,
        E: Executor<'a, Database = Any>,
    {
        query.limit(self.effective_limit()).offset(self.offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_limit() {
        assert_eq!(Pagination::new(0, 0).effective_limit(), 1);
        assert_eq!(Pagination::new(0, 10_000).effective_limit(), MAX_LIMIT);
    }

    #[test]
    fn computes_offset() {
        assert_eq!(Pagination::new(3, 20).offset(), 60);
        assert_eq!(Pagination::default().offset(), 0);
    }
}
