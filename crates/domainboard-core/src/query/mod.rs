// ── Client-side query engine ──
//
// Filter → sort → paginate over an in-memory record set. Pure and
// synchronous: no I/O, no errors. Malformed criteria (inverted ranges,
// pages past the end) simply produce empty output.

mod filter;
mod page;
mod sort;
mod view;

use chrono::{DateTime, Utc};

pub use filter::{DateRange, DomainFilter, NumericRange, TicketFilter};
pub use page::PageSpec;
pub use sort::{DomainColumn, SortKey, SortOrder, SortSpec, TicketColumn};
pub use view::QueryView;

// ── Traits ──────────────────────────────────────────────────────────

/// A record with server-maintained timestamps, used for default ordering.
pub trait Record: Clone {
    fn created_at(&self) -> Option<DateTime<Utc>>;
    fn updated_at(&self) -> Option<DateTime<Utc>>;

    /// Epoch seconds of `createdAt`, falling back to `updatedAt`, else 0.
    fn recency(&self) -> i64 {
        self.created_at()
            .or_else(|| self.updated_at())
            .map_or(0, |t| t.timestamp())
    }
}

/// A record that can be ordered by one of its columns.
pub trait Sortable: Record {
    type Column: Copy;

    fn sort_key(&self, column: Self::Column) -> SortKey;
}

/// A predicate over one record type.
pub trait Filter<T> {
    fn matches(&self, record: &T) -> bool;
}

// ── Results ─────────────────────────────────────────────────────────

/// One visible page plus the number of records that matched overall.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> QueryResult<T> {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ── Evaluation ──────────────────────────────────────────────────────

/// Default-order, filter and sort a copy of `records`, without paging.
///
/// This is the full result set that export operates on.
pub fn filtered<T, F>(records: &[T], filter: &F, sort: &SortSpec<T::Column>) -> Vec<T>
where
    T: Sortable,
    F: Filter<T>,
{
    let mut rows = records.to_vec();
    rows.sort_by_key(|r| std::cmp::Reverse(r.recency()));
    rows.retain(|r| filter.matches(r));
    sort.apply(&mut rows);
    rows
}

/// Run a complete query and return the requested page.
pub fn run_query<T, F>(
    records: &[T],
    filter: &F,
    sort: &SortSpec<T::Column>,
    page: PageSpec,
) -> QueryResult<T>
where
    T: Sortable,
    F: Filter<T>,
{
    let rows = filtered(records, filter, sort);
    QueryResult {
        total: rows.len(),
        items: page.slice(&rows).to_vec(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{Category, Domain, DomainName, EntityId, Ticket, TicketStatus};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    pub(crate) fn at(day: u32, hour: u32) -> Option<DateTime<Utc>> {
        Utc.with_ymd_and_hms(2024, 3, day, hour, 0, 0).single()
    }

    pub(crate) fn domain(id: &str, name: &str, da: i64, created: Option<DateTime<Utc>>) -> Domain {
        Domain {
            id: EntityId::from(id),
            domain_name: DomainName::new(name),
            country: "US".into(),
            category: Category::Gov,
            da,
            created_at: created,
            ..Domain::default()
        }
    }

    pub(crate) fn sample_domains() -> Vec<Domain> {
        vec![
            domain("1", "alpha.com", 50, at(1, 10)),
            domain("2", "bravo.org", 20, at(4, 10)),
            domain("3", "charlie.net", 80, at(2, 10)),
            domain("4", "delta.io", 40, None),
            domain("5", "echo.gov", 100, at(3, 10)),
        ]
    }

    fn ids(rows: &[Domain]) -> Vec<&str> {
        rows.iter().map(|d| d.id.as_str()).collect()
    }

    #[test]
    fn empty_filter_yields_default_order() {
        let rows = filtered(
            &sample_domains(),
            &DomainFilter::default(),
            &SortSpec::default(),
        );
        assert_eq!(ids(&rows), vec!["2", "5", "3", "1", "4"]);
    }

    #[test]
    fn default_order_falls_back_to_updated_at() {
        let mut records = sample_domains();
        records[3].updated_at = at(5, 0);
        let rows = filtered(&records, &DomainFilter::default(), &SortSpec::default());
        assert_eq!(rows[0].id.as_str(), "4");
    }

    #[test]
    fn da_range_scenario() {
        let filter = DomainFilter {
            da_range: NumericRange::new(40, 100),
            ..DomainFilter::default()
        };
        let rows = filtered(&sample_domains(), &filter, &SortSpec::default());
        let mut names: Vec<_> = rows.iter().map(|d| d.domain_name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["alpha.com", "charlie.net", "delta.io", "echo.gov"]);
    }

    #[test]
    fn pages_partition_the_total() {
        let records = sample_domains();
        let sort = SortSpec::default();
        let filter = DomainFilter::default();
        let mut seen = 0;
        for current in 1..=3 {
            let result = run_query(&records, &filter, &sort, PageSpec::new(current, 2));
            assert!(result.items.len() <= 2);
            assert_eq!(result.total, 5);
            seen += result.items.len();
        }
        assert_eq!(seen, 5);

        let past_end = run_query(&records, &filter, &sort, PageSpec::new(4, 2));
        assert!(past_end.is_empty());
        assert_eq!(past_end.total, 5);
    }

    #[test]
    fn sort_is_idempotent_and_reversible() {
        let records = sample_domains();
        let filter = DomainFilter::default();
        let asc = SortSpec::new(DomainColumn::Da, SortOrder::Ascend);
        let desc = SortSpec::new(DomainColumn::Da, SortOrder::Descend);

        let once = filtered(&records, &filter, &asc);
        let twice = filtered(&once, &filter, &asc);
        assert_eq!(ids(&once), ids(&twice));

        let mut reversed = filtered(&records, &filter, &desc);
        reversed.reverse();
        assert_eq!(ids(&once), ids(&reversed));
        assert_eq!(ids(&once), vec!["2", "4", "1", "3", "5"]);
    }

    #[test]
    fn ticket_domain_substring_scenario() {
        let tickets = vec![
            Ticket {
                id: EntityId::from("t1"),
                request_domains: vec!["myshop.com".into(), "blog.net".into()],
                ..Ticket::default()
            },
            Ticket {
                id: EntityId::from("t2"),
                request_domains: vec!["news.org".into()],
                status: TicketStatus::Read,
                ..Ticket::default()
            },
        ];
        let filter = TicketFilter {
            domains: vec!["SHOP".into()],
            ..TicketFilter::default()
        };
        let rows = filtered(&tickets, &filter, &SortSpec::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id.as_str(), "t1");
    }

    #[test]
    fn ticket_status_sorts_by_name() {
        let tickets: Vec<Ticket> = [
            TicketStatus::Sold,
            TicketStatus::New,
            TicketStatus::Cancelled,
            TicketStatus::Read,
        ]
        .into_iter()
        .enumerate()
        .map(|(i, status)| Ticket {
            id: EntityId::from(i.to_string()),
            status,
            ..Ticket::default()
        })
        .collect();

        let rows = filtered(
            &tickets,
            &TicketFilter::default(),
            &SortSpec::new(TicketColumn::Status, SortOrder::Ascend),
        );
        let order: Vec<_> = rows.iter().map(|t| t.status).collect();
        assert_eq!(
            order,
            vec![
                TicketStatus::Cancelled,
                TicketStatus::New,
                TicketStatus::Read,
                TicketStatus::Sold
            ]
        );
    }
}
