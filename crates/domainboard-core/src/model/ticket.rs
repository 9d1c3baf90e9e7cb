// ── Ticket domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::entity_id::EntityId;

/// Ticket lifecycle: New → Read → {Sold, Cancelled}.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum TicketStatus {
    #[default]
    New,
    Read,
    Sold,
    Cancelled,
}

impl TicketStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Sold | Self::Cancelled)
    }

    /// Whether the lifecycle allows moving from `self` to `next`.
    ///
    /// Terminal states refuse everything, and a transition to the same
    /// state is refused.
    pub fn can_transition_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::New, Self::Read | Self::Sold | Self::Cancelled)
            | (Self::Read, Self::Sold | Self::Cancelled) => true,
            _ => false,
        }
    }
}

/// A customer's purchase request for one or more listings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ticket {
    pub id: EntityId,
    pub customer_id: String,
    /// Requested names, referencing listings by name (not id).
    pub request_domains: Vec<String>,
    pub request_time: Option<DateTime<Utc>>,
    pub status: TicketStatus,
    /// Agreed price, set when the ticket is sold.
    pub price: Option<f64>,
    pub note: String,
    #[serde(rename = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Ticket {
    pub fn is_new(&self) -> bool {
        self.status == TicketStatus::New
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn lifecycle_transitions() {
        use TicketStatus::{Cancelled, New, Read, Sold};

        assert!(New.can_transition_to(Read));
        assert!(New.can_transition_to(Sold));
        assert!(Read.can_transition_to(Cancelled));
        assert!(!Read.can_transition_to(New));
        assert!(!New.can_transition_to(New));
        for next in TicketStatus::iter() {
            assert!(!Sold.can_transition_to(next));
            assert!(!Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn status_parses_any_case() {
        assert_eq!("cancelled".parse::<TicketStatus>().unwrap(), TicketStatus::Cancelled);
        assert_eq!("SOLD".parse::<TicketStatus>().unwrap(), TicketStatus::Sold);
        assert!("closed".parse::<TicketStatus>().is_err());
        assert_eq!(TicketStatus::Read.to_string(), "Read");
    }
}
