// ── Filter specifications ──

use chrono::{DateTime, NaiveDate, Utc};

use super::Filter;
use crate::model::{Category, Domain, Ticket, TicketStatus};

// ── Range primitives ────────────────────────────────────────────────

/// Inclusive `[min, max]` bound on a 0–100 metric.
///
/// The full `[0, 100]` range is the "unset" value and matches anything,
/// including out-of-range metrics. An inverted range matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumericRange {
    pub min: i64,
    pub max: i64,
}

impl NumericRange {
    pub const FULL: Self = Self { min: 0, max: 100 };

    pub fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    pub fn is_unset(&self) -> bool {
        *self == Self::FULL
    }

    pub fn contains(&self, value: i64) -> bool {
        self.is_unset() || (self.min..=self.max).contains(&value)
    }
}

impl Default for NumericRange {
    fn default() -> Self {
        Self::FULL
    }
}

/// Calendar-day window, evaluated in UTC.
///
/// A timestamp matches when it falls strictly after the start of
/// `start` and strictly before the end of `end`. Absent timestamps
/// never match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, at: Option<DateTime<Utc>>) -> bool {
        let Some(at) = at else {
            return false;
        };
        let (Some(lo), Some(hi)) = (
            self.start.and_hms_opt(0, 0, 0),
            self.end.and_hms_milli_opt(23, 59, 59, 999),
        ) else {
            return false;
        };
        at > lo.and_utc() && at < hi.and_utc()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn date_clause(range: Option<&DateRange>, at: Option<DateTime<Utc>>) -> bool {
    range.is_none_or(|r| r.contains(at))
}

// ── Domain filter ───────────────────────────────────────────────────

/// Every clause is ANDed; an empty or `None` clause matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainFilter {
    /// Case-insensitive substring of the domain name.
    pub domain_name: String,
    /// Exact country values.
    pub countries: Vec<String>,
    pub categories: Vec<Category>,
    pub da_range: NumericRange,
    pub pa_range: NumericRange,
    pub ss_range: NumericRange,
    /// `Some(true)` keeps available listings, `Some(false)` sold ones.
    pub status: Option<bool>,
    pub ischannel: Option<bool>,
    /// Window on `createdAt`.
    pub date_range: Option<DateRange>,
    /// Window on `postDateTime`.
    pub post_date_range: Option<DateRange>,
}

impl DomainFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Filter<Domain> for DomainFilter {
    fn matches(&self, d: &Domain) -> bool {
        (self.domain_name.is_empty() || contains_ignore_case(d.domain_name.as_str(), &self.domain_name))
            && (self.countries.is_empty() || self.countries.contains(&d.country))
            && (self.categories.is_empty() || self.categories.contains(&d.category))
            && self.da_range.contains(d.da)
            && self.pa_range.contains(d.pa)
            && self.ss_range.contains(d.ss)
            && self.status.is_none_or(|s| s == d.status)
            && self.ischannel.is_none_or(|c| c == d.ischannel)
            && date_clause(self.date_range.as_ref(), d.created_at)
            && date_clause(self.post_date_range.as_ref(), d.post_date_time)
    }
}

// ── Ticket filter ───────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TicketFilter {
    /// Case-insensitive substring of the customer id.
    pub customer_id: String,
    pub status: Option<TicketStatus>,
    /// Matches when any needle is a substring of any requested domain.
    pub domains: Vec<String>,
    /// Window on `request_time`.
    pub date_range: Option<DateRange>,
}

impl TicketFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Filter<Ticket> for TicketFilter {
    fn matches(&self, t: &Ticket) -> bool {
        let domains_match = self.domains.is_empty()
            || self.domains.iter().any(|needle| {
                t.request_domains
                    .iter()
                    .any(|requested| contains_ignore_case(requested, needle))
            });

        (self.customer_id.is_empty() || contains_ignore_case(&t.customer_id, &self.customer_id))
            && self.status.is_none_or(|s| s == t.status)
            && domains_match
            && date_clause(self.date_range.as_ref(), t.request_time)
    }
}
