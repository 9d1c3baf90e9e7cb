// ── Pagination ──

/// 1-based page window. Both fields are clamped to at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    current: usize,
    page_size: usize,
}

impl PageSpec {
    pub const DEFAULT_SIZE: usize = 10;

    pub fn new(current: usize, page_size: usize) -> Self {
        Self {
            current: current.max(1),
            page_size: page_size.max(1),
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub(crate) fn with_current(self, current: usize) -> Self {
        Self::new(current, self.page_size)
    }

    /// Zero-based offset of the first record on this page.
    pub fn offset(&self) -> usize {
        (self.current - 1).saturating_mul(self.page_size)
    }

    /// Records on this page, clipped to the slice; empty past the end.
    pub fn slice<'a, T>(&self, rows: &'a [T]) -> &'a [T] {
        let start = self.offset().min(rows.len());
        let end = start.saturating_add(self.page_size).min(rows.len());
        &rows[start..end]
    }

    /// Number of pages needed for `total` records (at least 1).
    pub fn page_count(&self, total: usize) -> usize {
        total.div_ceil(self.page_size).max(1)
    }

    /// 1-based inclusive range shown on this page, e.g. `(11, 20)`.
    ///
    /// `None` when the page is empty.
    pub fn bounds(&self, total: usize) -> Option<(usize, usize)> {
        let start = self.offset();
        (start < total).then(|| (start + 1, start.saturating_add(self.page_size).min(total)))
    }
}

impl Default for PageSpec {
    fn default() -> Self {
        Self::new(1, Self::DEFAULT_SIZE)
    }
}
