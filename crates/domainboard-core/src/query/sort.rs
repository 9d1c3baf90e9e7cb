// ── Sort specifications ──

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use strum::{Display, EnumIter, EnumString};

use super::{Record, Sortable};
use crate::model::{Domain, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum SortOrder {
    #[default]
    #[strum(to_string = "asc", serialize = "ascend", serialize = "ascending")]
    Ascend,
    #[strum(to_string = "desc", serialize = "descend", serialize = "descending")]
    Descend,
}

/// Comparison key extracted from a column.
///
/// Text is pre-lowercased; missing numbers and timestamps are 0.
#[derive(Debug, Clone, PartialEq)]
pub enum SortKey {
    Text(String),
    Number(f64),
    Bool(bool),
    /// Epoch seconds.
    Time(i64),
}

impl SortKey {
    pub fn text(s: &str) -> Self {
        Self::Text(s.to_lowercase())
    }

    pub fn time(at: Option<DateTime<Utc>>) -> Self {
        Self::Time(at.map_or(0, |t| t.timestamp()))
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Bool(a), Self::Bool(b)) => a.cmp(b),
            (Self::Time(a), Self::Time(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

/// Column plus direction. A `None` column keeps the default order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<C> {
    pub column: Option<C>,
    pub order: SortOrder,
}

impl<C> Default for SortSpec<C> {
    fn default() -> Self {
        Self {
            column: None,
            order: SortOrder::Ascend,
        }
    }
}

impl<C: Copy> SortSpec<C> {
    pub fn new(column: C, order: SortOrder) -> Self {
        Self {
            column: Some(column),
            order,
        }
    }

    /// Stable in-place sort; equal keys keep their incoming order.
    pub(crate) fn apply<T: Sortable<Column = C>>(&self, rows: &mut [T]) {
        let Some(column) = self.column else {
            return;
        };
        rows.sort_by(|a, b| {
            let ord = a.sort_key(column).compare(&b.sort_key(column));
            match self.order {
                SortOrder::Ascend => ord,
                SortOrder::Descend => ord.reverse(),
            }
        });
    }
}

// ── Domain columns ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum DomainColumn {
    #[strum(to_string = "name", serialize = "domainName", serialize = "domain-name")]
    DomainName,
    #[strum(to_string = "country")]
    Country,
    #[strum(to_string = "category")]
    Category,
    #[strum(to_string = "type", serialize = "panel-type")]
    PanelType,
    #[strum(to_string = "da")]
    Da,
    #[strum(to_string = "pa")]
    Pa,
    #[strum(to_string = "ss")]
    Ss,
    #[strum(to_string = "backlink", serialize = "backlinks")]
    Backlink,
    #[strum(to_string = "price")]
    Price,
    #[strum(to_string = "status")]
    Status,
    #[strum(to_string = "channel", serialize = "ischannel")]
    Ischannel,
    #[strum(to_string = "posted", serialize = "postDateTime")]
    PostDateTime,
    #[strum(to_string = "created", serialize = "createdAt")]
    CreatedAt,
    #[strum(to_string = "updated", serialize = "updatedAt")]
    UpdatedAt,
}

impl Record for Domain {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Sortable for Domain {
    type Column = DomainColumn;

    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    fn sort_key(&self, column: DomainColumn) -> SortKey {
        match column {
            DomainColumn::DomainName => SortKey::text(self.domain_name.as_str()),
            DomainColumn::Country => SortKey::text(&self.country),
            DomainColumn::Category => SortKey::text(self.category.as_str()),
            DomainColumn::PanelType => SortKey::text(self.panel_type.as_str()),
            DomainColumn::Da => SortKey::Number(self.da as f64),
            DomainColumn::Pa => SortKey::Number(self.pa as f64),
            DomainColumn::Ss => SortKey::Number(self.ss as f64),
            DomainColumn::Backlink => SortKey::Number(self.backlink as f64),
            DomainColumn::Price => SortKey::Number(self.price),
            DomainColumn::Status => SortKey::Bool(self.status),
            DomainColumn::Ischannel => SortKey::Bool(self.ischannel),
            DomainColumn::PostDateTime => SortKey::time(self.post_date_time),
            DomainColumn::CreatedAt => SortKey::time(self.created_at),
            DomainColumn::UpdatedAt => SortKey::time(self.updated_at),
        }
    }
}

// ── Ticket columns ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum TicketColumn {
    #[strum(to_string = "customer", serialize = "customer_id")]
    CustomerId,
    #[strum(to_string = "domains", serialize = "request_domains")]
    RequestDomains,
    #[strum(to_string = "requested", serialize = "request_time")]
    RequestTime,
    #[strum(to_string = "status")]
    Status,
    #[strum(to_string = "price")]
    Price,
    #[strum(to_string = "created", serialize = "createdAt")]
    CreatedAt,
    #[strum(to_string = "updated", serialize = "updatedAt")]
    UpdatedAt,
}

impl Record for Ticket {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

impl Sortable for Ticket {
    type Column = TicketColumn;

    fn sort_key(&self, column: TicketColumn) -> SortKey {
        match column {
            TicketColumn::CustomerId => SortKey::text(&self.customer_id),
            TicketColumn::RequestDomains => SortKey::text(&self.request_domains.join(", ")),
            TicketColumn::RequestTime => SortKey::time(self.request_time),
            TicketColumn::Status => SortKey::text(self.status.as_ref()),
            TicketColumn::Price => SortKey::Number(self.price.unwrap_or(0.0)),
            TicketColumn::CreatedAt => SortKey::time(self.created_at),
            TicketColumn::UpdatedAt => SortKey::time(self.updated_at),
        }
    }
}
