//! Pagination request and result envelope

use serde::{Deserialize, Serialize};

/// A 1-based pagination request
///
/// Raw values are kept as supplied; the accessors coerce non-positive
/// page/size to 1, so adapters never see a zero window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pageable {
    pub page: u32,
    pub size: u32,
}

impl Pageable {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// The effective page number (minimum 1)
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    /// The effective page size (minimum 1)
    pub fn size(&self) -> u32 {
        self.size.max(1)
    }

    /// Number of rows skipped before this page starts
    pub fn offset(&self) -> usize {
        (self.size() as usize) * ((self.page() as usize) - 1)
    }
}

impl Default for Pageable {
    fn default() -> Self {
        Self { page: 1, size: 10 }
    }
}

/// One page of results plus both count universes
///
/// `total` counts every row; `filtered` counts rows matching the request
/// filter. Invariants: `content.len() <= size` and `filtered <= total`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
    pub filtered: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, pageable: Pageable, total: u64, filtered: u64) -> Self {
        Self {
            content,
            page: pageable.page(),
            size: pageable.size(),
            total,
            filtered,
        }
    }

    /// Number of pages the filtered universe spans
    pub fn page_count(&self) -> u64 {
        self.filtered.div_ceil(self.size.max(1) as u64)
    }

    /// Transform the content while keeping the page metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total: self.total,
            filtered: self.filtered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pageable_coerces_to_minimums() {
        let pageable = Pageable::new(0, 0);
        assert_eq!(pageable.page(), 1);
        assert_eq!(pageable.size(), 1);
        assert_eq!(pageable.offset(), 0);
    }

    #[test]
    fn test_pageable_offset() {
        let pageable = Pageable::new(3, 10);
        assert_eq!(pageable.offset(), 20);
    }

    #[test]
    fn test_pageable_default() {
        let pageable = Pageable::default();
        assert_eq!(pageable.page(), 1);
        assert_eq!(pageable.size(), 10);
    }

    #[test]
    fn test_page_metadata() {
        let page = Page::new(vec![1, 2], Pageable::new(1, 2), 5, 5);
        assert_eq!(page.content.len(), 2);
        assert_eq!(page.total, 5);
        assert_eq!(page.filtered, 5);
        assert_eq!(page.page_count(), 3);
    }

    #[test]
    fn test_page_map_keeps_metadata() {
        let page = Page::new(vec![1, 2, 3], Pageable::new(2, 3), 9, 6);
        let mapped = page.map(|n| n.to_string());
        assert_eq!(mapped.content, vec!["1", "2", "3"]);
        assert_eq!(mapped.page, 2);
        assert_eq!(mapped.filtered, 6);
        assert_eq!(mapped.page_count(), 2);
    }

    #[test]
    fn test_page_count_empty() {
        let page: Page<i32> = Page::new(vec![], Pageable::default(), 0, 0);
        assert_eq!(page.page_count(), 0);
    }
}
