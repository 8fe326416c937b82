//! Pagination request for the user listing

pub const DEFAULT_PER_PAGE: u32 = 10;
pub const DEFAULT_PAGE: u32 = 1;

/// 1-based page of `per_page` rows. Both values are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    per_page: u32,
    page: u32,
}

impl PageRequest {
    /// Values below 1 fall back to the defaults
    pub fn new(per_page: Option<i64>, page: Option<i64>) -> Self {
        let clamp = |value: Option<i64>, default: u32| match value {
            Some(v) if v >= 1 => u32::try_from(v).unwrap_or(u32::MAX),
            _ => default,
        };
        Self {
            per_page: clamp(per_page, DEFAULT_PER_PAGE),
            page: clamp(page, DEFAULT_PAGE),
        }
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Rows skipped before this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let page = PageRequest::default();
        assert_eq!(page.per_page(), 10);
        assert_eq!(page.page(), 1);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_below_minimum_falls_back() {
        let page = PageRequest::new(Some(0), Some(-3));
        assert_eq!(page.per_page(), 10);
        assert_eq!(page.page(), 1);
    }

    #[test]
    fn test_true_offset() {
        assert_eq!(PageRequest::new(Some(10), Some(3)).offset(), 20);
        assert_eq!(PageRequest::new(Some(25), Some(2)).offset(), 25);
    }

    #[test]
    fn test_huge_values_do_not_overflow() {
        let page = PageRequest::new(Some(i64::MAX), Some(i64::MAX));
        assert_eq!(page.offset(), u64::from(u32::MAX - 1) * u64::from(u32::MAX));
    }
}
