// ── Stateful query view ──
//
// Holds filter/sort/page state with the cached filtered-and-sorted set.
// Filter, sort and record changes re-evaluate and jump back to page 1;
// page changes only re-slice the cache.

use super::{Filter, PageSpec, QueryResult, SortSpec, Sortable, filtered};

pub struct QueryView<T: Sortable, F> {
    records: Vec<T>,
    filter: F,
    sort: SortSpec<T::Column>,
    page: PageSpec,
    matched: Vec<T>,
}

impl<T, F> QueryView<T, F>
where
    T: Sortable,
    F: Filter<T> + Default,
{
    pub fn new(records: Vec<T>) -> Self {
        Self::with_state(records, F::default(), SortSpec::default(), PageSpec::default())
    }
}

impl<T, F> QueryView<T, F>
where
    T: Sortable,
    F: Filter<T>,
{
    pub fn with_state(records: Vec<T>, filter: F, sort: SortSpec<T::Column>, page: PageSpec) -> Self {
        let mut view = Self {
            records,
            filter,
            sort,
            page,
            matched: Vec::new(),
        };
        view.recompute();
        view
    }

    // ── Transitions ─────────────────────────────────────────────────

    /// Replace the filter, re-evaluate, and return to page 1.
    pub fn set_filter(&mut self, filter: F) {
        self.filter = filter;
        self.recompute();
        self.page = self.page.with_current(1);
    }

    /// Replace the sort, re-evaluate, and return to page 1.
    pub fn set_sort(&mut self, sort: SortSpec<T::Column>) {
        self.sort = sort;
        self.recompute();
        self.page = self.page.with_current(1);
    }

    /// Move to another page of the cached result.
    pub fn set_page(&mut self, current: usize) {
        self.page = self.page.with_current(current);
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page = PageSpec::new(self.page.current(), page_size);
    }

    /// Swap in a fresh record set (after a re-fetch) and return to page 1.
    pub fn set_records(&mut self, records: Vec<T>) {
        self.records = records;
        self.recompute();
        self.page = self.page.with_current(1);
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn page(&self) -> PageSpec {
        self.page
    }

    pub fn filter(&self) -> &F {
        &self.filter
    }

    pub fn sort(&self) -> &SortSpec<T::Column> {
        &self.sort
    }

    pub fn total(&self) -> usize {
        self.matched.len()
    }

    /// Full filtered-and-sorted set, unpaged.
    pub fn matched(&self) -> &[T] {
        &self.matched
    }

    pub fn visible(&self) -> &[T] {
        self.page.slice(&self.matched)
    }

    pub fn result(&self) -> QueryResult<T> {
        QueryResult {
            items: self.visible().to_vec(),
            total: self.total(),
        }
    }

    fn recompute(&mut self) {
        self.matched = filtered(&self.records, &self.filter, &self.sort);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Domain;
    use crate::query::tests::sample_domains;
    use crate::query::{DomainColumn, DomainFilter, NumericRange, SortOrder};

    fn view() -> QueryView<Domain, DomainFilter> {
        let mut v = QueryView::new(sample_domains());
        v.set_page_size(2);
        v
    }

    #[test]
    fn filter_change_resets_to_first_page() {
        let mut v = view();
        v.set_page(3);
        assert_eq!(v.page().current(), 3);
        assert_eq!(v.visible().len(), 1);

        v.set_filter(DomainFilter {
            da_range: NumericRange::new(40, 100),
            ..DomainFilter::default()
        });
        assert_eq!(v.page().current(), 1);
        assert_eq!(v.total(), 4);
    }

    #[test]
    fn sort_change_resets_to_first_page() {
        let mut v = view();
        v.set_page(2);
        v.set_sort(SortSpec::new(DomainColumn::Da, SortOrder::Descend));
        assert_eq!(v.page().current(), 1);
        assert_eq!(v.visible()[0].da, 100);
    }

    #[test]
    fn page_changes_only_reslice() {
        let mut v = view();
        let before = v.matched().to_vec();
        v.set_page(2);
        v.set_page_size(3);
        assert_eq!(v.matched(), before.as_slice());
        assert_eq!(v.page().current(), 2);
        assert_eq!(v.visible().len(), 2);
    }

    #[test]
    fn new_records_return_to_first_page() {
        let mut v = view();
        v.set_page(2);
        let mut records = sample_domains();
        records.truncate(3);
        v.set_records(records);
        assert_eq!(v.page().current(), 1);
        assert_eq!(v.page().page_size(), 2);
        assert_eq!(v.total(), 3);
        assert_eq!(v.result().items.len(), 2);
    }
}
