//! Page-number pagination for list endpoints
//!
//! Responses use the `{count, next, previous, results}` envelope; `next` and
//! `previous` carry page numbers.

use serde::{Deserialize, Serialize};

/// Page size constant for all pagination
pub const PAGE_SIZE: i64 = 20;

/// `?page=N` query parameter
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
}

/// Pagination metadata calculated from total results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: i64,
    /// Total number of pages
    pub total_pages: i64,
    /// Offset for SQL LIMIT/OFFSET query
    pub offset: i64,
}

/// Validate the requested page against the total number of results
///
/// Returns `None` for pages outside `[1, total_pages]`. An empty result set
/// still has a first page.
///
/// # Examples
/// ```
/// use fieldsight_kc::pagination::calculate_pagination;
///
/// // 45 results = 3 pages (20 + 20 + 5)
/// let p = calculate_pagination(45, 3).unwrap();
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 40);
///
/// assert!(calculate_pagination(45, 4).is_none());
/// ```
pub fn calculate_pagination(total_results: i64, requested_page: i64) -> Option<Pagination> {
    let total_pages = (total_results + PAGE_SIZE - 1) / PAGE_SIZE;
    if requested_page < 1 || requested_page > total_pages.max(1) {
        return None;
    }

    Some(Pagination {
        page: requested_page,
        total_pages,
        offset: (requested_page - 1) * PAGE_SIZE,
    })
}

/// Paginated response body
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<i64>,
    pub previous: Option<i64>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(count: i64, pagination: Pagination, results: Vec<T>) -> Self {
        let next = (pagination.page < pagination.total_pages).then_some(pagination.page + 1);
        let previous = (pagination.page > 1).then_some(pagination.page - 1);
        Self {
            count,
            next,
            previous,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_normal() {
        let p = calculate_pagination(45, 2).unwrap();
        assert_eq!(p.page, 2);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.offset, 20);
    }

    #[test]
    fn test_pagination_exact_page_boundary() {
        let p = calculate_pagination(40, 2).unwrap();
        assert_eq!(p.total_pages, 2);
        assert_eq!(p.offset, 20);
        assert!(calculate_pagination(40, 3).is_none());
    }

    #[test]
    fn test_pagination_out_of_range() {
        assert!(calculate_pagination(45, 0).is_none());
        assert!(calculate_pagination(45, -1).is_none());
        assert!(calculate_pagination(45, 99).is_none());
    }

    #[test]
    fn test_pagination_empty() {
        let p = calculate_pagination(0, 1).unwrap();
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.offset, 0);
        assert!(calculate_pagination(0, 2).is_none());
    }

    #[test]
    fn test_page_links() {
        let first: Page<()> = Page::new(45, calculate_pagination(45, 1).unwrap(), vec![]);
        assert_eq!((first.previous, first.next), (None, Some(2)));

        let middle: Page<()> = Page::new(45, calculate_pagination(45, 2).unwrap(), vec![]);
        assert_eq!((middle.previous, middle.next), (Some(1), Some(3)));

        let last: Page<()> = Page::new(45, calculate_pagination(45, 3).unwrap(), vec![]);
        assert_eq!((last.previous, last.next), (Some(2), None));

        let empty: Page<()> = Page::new(0, calculate_pagination(0, 1).unwrap(), vec![]);
        assert_eq!((empty.previous, empty.next), (None, None));
    }
}
