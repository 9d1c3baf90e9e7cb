// ── Listing domain model ──
//
// Canonical, fully-defaulted representations of what the API returns.
// Consumers (query engine, CSV codec, CLI) depend only on these.

pub mod domain;
pub mod entity_id;
pub mod ticket;

pub use domain::{Category, Domain, PanelType};
pub use entity_id::{DomainName, EntityId, normalize_domain_name};
pub use ticket::{Ticket, TicketStatus};
