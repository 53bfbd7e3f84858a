use serde::Serialize;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PER_PAGE: u64 = 10;

const MAX_SQL_ROWS: u64 = i64::MAX as u64;

/// 1-indexed page window for listing queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u64,
    pub per_page: u64,
}

impl Pagination {
    /// Build a window from raw request values. Anything below 1 falls back
    /// to the defaults (page 1, 10 per page).
    pub fn new(page: i64, per_page: i64) -> Self {
        Self {
            page: if page < 1 { DEFAULT_PAGE } else { page as u64 },
            per_page: if per_page < 1 {
                DEFAULT_PER_PAGE
            } else {
                per_page as u64
            },
        }
    }

    /// Same as [`Pagination::new`] but for optional query parameters.
    pub fn from_query(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self::new(page.unwrap_or(0), per_page.unwrap_or(0))
    }

    /// Rows to skip. Capped at `i64::MAX` because SQL backends bind
    /// OFFSET as a signed 64-bit integer; a page that far out is simply empty.
    pub fn offset(&self) -> u64 {
        (self.page - 1)
            .saturating_mul(self.per_page)
            .min(MAX_SQL_ROWS)
    }

    pub fn limit(&self) -> u64 {
        self.per_page.min(MAX_SQL_ROWS)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// One page of results plus the unpaginated total.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, pagination: Pagination) -> Self {
        Self {
            items,
            total,
            page: pagination.page,
            per_page: pagination.per_page,
        }
    }

    pub fn total_pages(&self) -> u64 {
        self.total.div_ceil(self.per_page.max(1))
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_positive_values_fall_back_to_defaults() {
        assert_eq!(Pagination::new(0, 0), Pagination::default());
        assert_eq!(Pagination::new(-3, -1), Pagination::default());
        assert_eq!(Pagination::from_query(None, Some(25)).per_page, 25);
    }

    #[test]
    fn test_offset() {
        assert_eq!(Pagination::new(1, 10).offset(), 0);
        assert_eq!(Pagination::new(3, 10).offset(), 20);
    }

    #[test]
    fn test_offset_stays_within_signed_range() {
        let far = Pagination::new(1_000_000_000_000_000_000, 10);
        assert_eq!(far.offset(), i64::MAX as u64);

        let huge = Pagination::new(i64::MAX, i64::MAX);
        assert_eq!(huge.offset(), i64::MAX as u64);
        assert_eq!(huge.limit(), i64::MAX as u64);
    }

    #[test]
    fn test_total_pages() {
        let page: Paginated<u8> = Paginated::new(vec![], 25, Pagination::new(1, 10));
        assert_eq!(page.total_pages(), 3);

        let empty: Paginated<u8> = Paginated::new(vec![], 0, Pagination::default());
        assert_eq!(empty.total_pages(), 0);
    }
}
