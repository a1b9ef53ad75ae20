//! Client-side pagination over a fully loaded collection.
//!
//! [`Pagination`] is a plain value with pure transitions; [`PagedList`] pairs
//! it with the items it slices. Out-of-range requests are clamped, never
//! reported as errors.

use std::{
    fmt,
    ops::{Range, RangeInclusive},
    str::FromStr,
};

use thiserror::Error;

/// Page sizes offered to the user.
pub const PAGE_SIZE_CHOICES: [usize; 5] = [3, 5, 10, 15, 20];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageSizeError {
    #[error("unsupported page size {0}; choose one of 3, 5, 10, 15, 20")]
    Unsupported(usize),
    #[error("page size must be a number, got {0:?}")]
    NotANumber(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageSize(usize);

impl PageSize {
    pub const DEFAULT: PageSize = PageSize(5);

    pub fn new(size: usize) -> Result<Self, PageSizeError> {
        if PAGE_SIZE_CHOICES.contains(&size) {
            Ok(Self(size))
        } else {
            Err(PageSizeError::Unsupported(size))
        }
    }

    pub fn get(self) -> usize {
        self.0
    }

    pub fn choices() -> impl Iterator<Item = PageSize> {
        PAGE_SIZE_CHOICES.into_iter().map(PageSize)
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<usize> for PageSize {
    type Error = PageSizeError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for PageSize {
    type Err = PageSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let size = s
            .trim()
            .parse::<usize>()
            .map_err(|_| PageSizeError::NotANumber(s.to_string()))?;
        Self::new(size)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Anything a page request can be made from. Conversion never fails:
/// unusable input resolves to page 1 before clamping.
pub trait PageTarget {
    fn page_number(&self) -> i64;
}

impl PageTarget for i64 {
    fn page_number(&self) -> i64 {
        *self
    }
}

impl PageTarget for i32 {
    fn page_number(&self) -> i64 {
        i64::from(*self)
    }
}

impl PageTarget for u32 {
    fn page_number(&self) -> i64 {
        i64::from(*self)
    }
}

impl PageTarget for usize {
    fn page_number(&self) -> i64 {
        i64::try_from(*self).unwrap_or(i64::MAX)
    }
}

impl PageTarget for f64 {
    fn page_number(&self) -> i64 {
        page_from_float(*self)
    }
}

impl PageTarget for &str {
    fn page_number(&self) -> i64 {
        parse_page_input(self)
    }
}

impl PageTarget for String {
    fn page_number(&self) -> i64 {
        parse_page_input(self)
    }
}

/// Reads free-form page input such as the "jump to page" box. Empty,
/// non-numeric, zero and NaN input all mean page 1; fractions are truncated
/// toward zero and infinities saturate, so `inf` lands on the last page.
pub fn parse_page_input(raw: &str) -> i64 {
    match raw.trim().parse::<f64>() {
        Ok(value) => page_from_float(value),
        Err(_) => 1,
    }
}

fn page_from_float(value: f64) -> i64 {
    if value.is_nan() || value == 0.0 {
        return 1;
    }
    // `as` saturates out-of-range and infinite floats.
    value.trunc() as i64
}

/// `max(1, ceil(len / page_size))`.
pub fn total_pages(len: usize, page_size: PageSize) -> usize {
    len.div_ceil(page_size.get()).max(1)
}

/// Footer numbers: record count and the 1-based positions shown.
/// `first` is 0 when there is nothing to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSummary {
    pub total: usize,
    pub first: usize,
    pub last: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page_size: PageSize,
    current_page: usize,
    total_items: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(PageSize::default())
    }
}

impl Pagination {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page_size,
            current_page: 1,
            total_items: 0,
        }
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.total_items, self.page_size)
    }

    /// New collection loaded wholesale: back to page 1.
    #[must_use]
    pub fn reset(self, total_items: usize) -> Self {
        Self {
            total_items,
            current_page: 1,
            ..self
        }
    }

    /// Collection changed in place: keep the page unless it no longer exists.
    #[must_use]
    pub fn with_len(self, total_items: usize) -> Self {
        Self {
            total_items,
            ..self
        }
        .clamped()
    }

    #[must_use]
    pub fn with_page_size(self, page_size: PageSize) -> Self {
        Self { page_size, ..self }.clamped()
    }

    #[must_use]
    pub fn go_to<P: PageTarget>(self, page: P) -> Self {
        let last = i64::try_from(self.total_pages()).unwrap_or(i64::MAX);
        let page = page.page_number().clamp(1, last);
        Self {
            current_page: usize::try_from(page).unwrap_or(1),
            ..self
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        self.go_to(self.current_page.saturating_add(1))
    }

    #[must_use]
    pub fn prev(self) -> Self {
        self.go_to(self.current_page.saturating_sub(1))
    }

    pub fn is_first_page(&self) -> bool {
        self.current_page == 1
    }

    pub fn is_last_page(&self) -> bool {
        self.current_page == self.total_pages()
    }

    /// Index range of the current page within the collection.
    pub fn window(&self) -> Range<usize> {
        let start = (self.current_page - 1)
            .saturating_mul(self.page_size.get())
            .min(self.total_items);
        let end = start
            .saturating_add(self.page_size.get())
            .min(self.total_items);
        start..end
    }

    pub fn summary(&self) -> PageSummary {
        let window = self.window();
        if window.is_empty() {
            return PageSummary {
                total: self.total_items,
                first: 0,
                last: 0,
            };
        }
        PageSummary {
            total: self.total_items,
            first: window.start + 1,
            last: window.end,
        }
    }

    pub fn page_numbers(&self) -> RangeInclusive<usize> {
        1..=self.total_pages()
    }

    fn clamped(self) -> Self {
        let current_page = self.current_page.clamp(1, self.total_pages());
        Self {
            current_page,
            ..self
        }
    }
}

/// A fully loaded collection plus the page currently shown.
#[derive(Debug, Clone)]
pub struct PagedList<T> {
    items: Vec<T>,
    pagination: Pagination,
}

impl<T> Default for PagedList<T> {
    fn default() -> Self {
        Self::new(PageSize::default())
    }
}

impl<T> PagedList<T> {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination::new(page_size),
        }
    }

    /// Replaces the collection after a full reload and returns to page 1.
    pub fn set_collection(&mut self, items: Vec<T>) {
        self.pagination = self.pagination.reset(items.len());
        self.items = items;
    }

    /// Removes matching items in place, keeping the current page when it
    /// still exists. Returns the number removed.
    pub fn remove_where<F>(&mut self, mut matches: F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let before = self.items.len();
        self.items.retain(|item| !matches(item));
        self.pagination = self.pagination.with_len(self.items.len());
        before - self.items.len()
    }

    pub fn set_page_size(&mut self, page_size: PageSize) {
        self.pagination = self.pagination.with_page_size(page_size);
    }

    pub fn go_to_page<P: PageTarget>(&mut self, page: P) {
        self.pagination = self.pagination.go_to(page);
    }

    pub fn next_page(&mut self) {
        self.pagination = self.pagination.next();
    }

    pub fn prev_page(&mut self) {
        self.pagination = self.pagination.prev();
    }

    pub fn visible_window(&self) -> &[T] {
        &self.items[self.pagination.window()]
    }

    pub fn total_pages(&self) -> usize {
        self.pagination.total_pages()
    }

    pub fn current_page(&self) -> usize {
        self.pagination.current_page()
    }

    pub fn page_size(&self) -> PageSize {
        self.pagination.page_size()
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    pub fn summary(&self) -> PageSummary {
        self.pagination.summary()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Collection index of the first item in the visible window.
    pub fn window_offset(&self) -> usize {
        self.pagination.window().start
    }
}

#[cfg(test)]
#[path = "tests/paging_tests.rs"]
mod tests;
