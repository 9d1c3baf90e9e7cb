// ── Central data store ──
//
// Thread-safe storage for listings and tickets. Every fetch replaces a
// whole collection; pushed tickets are upserted.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use super::collection::EntityCollection;
use crate::model::{Domain, EntityId, Ticket};

/// Central store for listings and tickets.
///
/// Reads are snapshot clones; writes use per-shard locks within `DashMap`.
pub struct DataStore {
    pub(crate) domains: EntityCollection<Domain>,
    pub(crate) tickets: EntityCollection<Ticket>,
    pub(crate) new_ticket_count: watch::Sender<u64>,
    pub(crate) last_full_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl DataStore {
    pub fn new() -> Self {
        let (new_ticket_count, _) = watch::channel(0);
        let (last_full_refresh, _) = watch::channel(None);

        Self {
            domains: EntityCollection::new(),
            tickets: EntityCollection::new(),
            new_ticket_count,
            last_full_refresh,
        }
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Replace every listing with a fresh fetch.
    pub fn apply_domains(&self, domains: Vec<Domain>) {
        debug!(count = domains.len(), "applying domains");
        self.domains
            .replace_all(domains.into_iter().map(|d| (d.id.clone(), d)).collect());
    }

    /// Replace every ticket with a fresh fetch and recount unread ones.
    pub fn apply_tickets(&self, tickets: Vec<Ticket>) {
        debug!(count = tickets.len(), "applying tickets");
        let unread = tickets.iter().filter(|t| t.is_new()).count();
        self.tickets
            .replace_all(tickets.into_iter().map(|t| (t.id.clone(), t)).collect());
        self.set_new_ticket_count(u64::try_from(unread).unwrap_or(u64::MAX));
    }

    /// Insert a pushed ticket. A previously unseen `New` ticket bumps
    /// the unread counter. Returns `true` if the ticket was new.
    pub fn upsert_ticket(&self, ticket: Ticket) -> bool {
        let unread = ticket.is_new();
        let is_new = self.tickets.upsert(ticket.id.clone(), ticket);
        if is_new && unread {
            self.new_ticket_count.send_modify(|n| *n += 1);
        }
        is_new
    }

    /// Overwrite the unread counter with the server's figure.
    pub fn set_new_ticket_count(&self, count: u64) {
        self.new_ticket_count.send_modify(|n| *n = count);
    }

    pub(crate) fn mark_refreshed(&self) {
        self.last_full_refresh.send_modify(|t| *t = Some(Utc::now()));
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn domains_snapshot(&self) -> Arc<Vec<Arc<Domain>>> {
        self.domains.snapshot()
    }

    pub fn tickets_snapshot(&self) -> Arc<Vec<Arc<Ticket>>> {
        self.tickets.snapshot()
    }

    /// Owned copies in server order, ready for the query engine.
    pub fn domains_owned(&self) -> Vec<Domain> {
        self.domains_snapshot().iter().map(|d| (**d).clone()).collect()
    }

    pub fn tickets_owned(&self) -> Vec<Ticket> {
        self.tickets_snapshot().iter().map(|t| (**t).clone()).collect()
    }

    // ── Single-entity lookups ────────────────────────────────────────

    pub fn domain_by_id(&self, id: &EntityId) -> Option<Arc<Domain>> {
        self.domains.get(id)
    }

    /// First listing whose name matches, ignoring case and scheme.
    pub fn domain_by_name(&self, name: &str) -> Option<Arc<Domain>> {
        let wanted = crate::model::DomainName::new(name);
        self.domains_snapshot()
            .iter()
            .find(|d| d.domain_name.matches(wanted.as_str()))
            .cloned()
    }

    pub fn ticket_by_id(&self, id: &EntityId) -> Option<Arc<Ticket>> {
        self.tickets.get(id)
    }

    // ── Count accessors ──────────────────────────────────────────────

    pub fn domain_count(&self) -> usize {
        self.domains.len()
    }

    pub fn ticket_count(&self) -> usize {
        self.tickets.len()
    }

    pub fn new_ticket_count(&self) -> u64 {
        *self.new_ticket_count.borrow()
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_full_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_full_refresh.borrow()
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{DomainName, TicketStatus};

    fn ticket(id: &str, status: TicketStatus) -> Ticket {
        Ticket {
            id: EntityId::from(id),
            status,
            ..Ticket::default()
        }
    }

    #[test]
    fn apply_tickets_counts_unread() {
        let store = DataStore::new();
        store.apply_tickets(vec![
            ticket("1", TicketStatus::New),
            ticket("2", TicketStatus::Read),
            ticket("3", TicketStatus::New),
        ]);
        assert_eq!(store.ticket_count(), 3);
        assert_eq!(store.new_ticket_count(), 2);
    }

    #[test]
    fn pushed_ticket_bumps_counter_once() {
        let store = DataStore::new();
        assert!(store.upsert_ticket(ticket("7", TicketStatus::New)));
        assert!(!store.upsert_ticket(ticket("7", TicketStatus::New)));
        assert_eq!(store.new_ticket_count(), 1);
        assert_eq!(store.tickets_snapshot()[0].id.as_str(), "7");
    }

    #[test]
    fn domain_lookup_by_name_ignores_case() {
        let store = DataStore::new();
        store.apply_domains(vec![Domain {
            id: EntityId::from("d1"),
            domain_name: DomainName::new("Shop.io"),
            ..Domain::default()
        }]);
        assert_eq!(
            store.domain_by_name("https://shop.IO/").unwrap().id.as_str(),
            "d1"
        );
        assert!(store.domain_by_name("other.io").is_none());
        assert_eq!(store.domains_owned().len(), 1);
        assert_eq!(store.domain_count(), 1);
    }
}
