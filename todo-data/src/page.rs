use serde::{Deserialize, Serialize};

/// Pagination parameters. Pages are 1-based.
#[derive(Debug, Clone, Deserialize)]
pub struct Pageable {
    pub page: u64,
    pub size: u64,
}

impl Default for Pageable {
    fn default() -> Self {
        Self { page: 1, size: 50 }
    }
}

impl Pageable {
    pub fn new(page: u64, size: u64) -> Self {
        Self { page, size }
    }

    pub fn offset(&self) -> u64 {
        self.size * self.page.saturating_sub(1)
    }

    pub fn limit(&self) -> u64 {
        self.size
    }
}

/// A page of results with pagination metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub pages: u64,
    pub total: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pageable: &Pageable, total: u64) -> Self {
        let pages = if total == 0 {
            1
        } else {
            total.div_ceil(pageable.size.max(1))
        };
        Self {
            items,
            page: pageable.page,
            size: pageable.size,
            pages,
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_zero_based_from_one_based_pages() {
        assert_eq!(Pageable::new(1, 50).offset(), 0);
        assert_eq!(Pageable::new(3, 20).offset(), 40);
    }

    #[test]
    fn page_count_rounds_up() {
        let page = Page::new(vec![1, 2], &Pageable::new(1, 2), 5);
        assert_eq!(page.pages, 3);
        assert_eq!(page.total, 5);
    }

    #[test]
    fn empty_result_still_has_one_page() {
        let page: Page<i32> = Page::new(vec![], &Pageable::default(), 0);
        assert_eq!(page.pages, 1);
    }
}
