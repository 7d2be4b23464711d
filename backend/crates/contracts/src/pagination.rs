//! Pagination block carried by list responses.

use serde::{Deserialize, Serialize};

use crate::shape::{FieldShape, ObjectShape, Shaped};

/// Default page when the client supplies none.
pub const DEFAULT_PAGE: u32 = 1;
/// Default page size when the client supplies none.
pub const DEFAULT_LIMIT: u32 = 20;
/// Largest page size a client may request.
pub const MAX_LIMIT: u32 = 100;

/// Pagination metadata.
///
/// ## Invariants
/// - `page >= 1`, `1 <= limit <= 100`.
/// - `total_pages == ceil(total / limit)` when built through [`Pagination::new`].
///   Values decoded from client input are not cross-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// One-based page index.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Total number of items across all pages.
    pub total: u64,
    /// Number of pages for `total` items at `limit` per page.
    pub total_pages: u64,
}

impl Pagination {
    /// Build a pagination block, deriving `total_pages` from `total` and `limit`.
    ///
    /// # Examples
    /// ```
    /// use contracts::Pagination;
    ///
    /// let block = Pagination::new(1, 20, 41);
    /// assert_eq!(block.total_pages, 3);
    /// ```
    #[must_use]
    pub const fn new(page: u32, limit: u32, total: u64) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            total.div_ceil(limit as u64)
        };
        Self {
            page,
            limit,
            total,
            total_pages,
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT, 0)
    }
}

/// Shape used to read pagination from query strings.
///
/// Every field is coerced from its string form and falls back to its default
/// when absent.
#[must_use]
pub fn pagination_shape() -> ObjectShape {
    ObjectShape::new()
        .field(
            "page",
            FieldShape::number()
                .coerce()
                .int()
                .min(1.0)
                .default(DEFAULT_PAGE),
        )
        .field(
            "limit",
            FieldShape::number()
                .coerce()
                .int()
                .min(1.0)
                .max(100.0)
                .default(DEFAULT_LIMIT),
        )
        .field(
            "total",
            FieldShape::number().coerce().int().min(0.0).default(0),
        )
        .field(
            "totalPages",
            FieldShape::number().coerce().int().min(0.0).default(0),
        )
}

impl Shaped for Pagination {
    fn shape() -> ObjectShape {
        pagination_shape()
    }
}

#[cfg(test)]
mod tests {
    //! Pagination arithmetic and query coercion.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(0, 20, 0)]
    #[case(20, 20, 1)]
    #[case(21, 20, 2)]
    #[case(100, 7, 15)]
    fn total_pages_rounds_up(#[case] total: u64, #[case] limit: u32, #[case] expected: u64) {
        assert_eq!(Pagination::new(1, limit, total).total_pages, expected);
    }

    #[rstest]
    fn zero_limit_yields_zero_pages() {
        assert_eq!(Pagination::new(1, 0, 10).total_pages, 0);
    }

    #[rstest]
    fn empty_query_takes_defaults() {
        let block = Pagination::parse(&json!({})).expect("defaults apply");
        assert_eq!(block, Pagination::default());
    }

    #[rstest]
    fn query_strings_are_coerced() {
        let block =
            Pagination::parse(&json!({ "page": "3", "limit": "50" })).expect("coerces strings");
        assert_eq!(block.page, 3);
        assert_eq!(block.limit, 50);
    }

    #[rstest]
    fn out_of_range_values_are_all_reported() {
        let failure = Pagination::parse(&json!({ "page": "0", "limit": "101", "total": "-1" }))
            .expect_err("invalid pagination");
        let fields: Vec<String> = failure.issues.iter().map(|issue| issue.path_string()).collect();
        assert_eq!(fields, vec!["page", "limit", "total"]);
    }
}
