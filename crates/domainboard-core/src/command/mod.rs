// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The
// controller routes each variant to its endpoint, then re-fetches the
// affected collection so the store reflects the server (last fetch wins).

pub mod requests;

use std::path::PathBuf;

use domainboard_api::{BulkAction, BulkActionResult, ImportOutcome};

use crate::error::CoreError;
use crate::model::{Domain, EntityId};

pub use requests::{CreateDomainsReport, SellTicketRequest, SharedAccess};

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All possible write operations against the listings API.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Listing operations ───────────────────────────────────────────
    CreateDomain {
        domain: Domain,
    },
    /// Several listings sharing one set of panel and hosting credentials.
    CreateDomains {
        domains: Vec<Domain>,
        access: SharedAccess,
    },
    /// Send the full editable state of a listing.
    UpdateDomain {
        id: EntityId,
        domain: Domain,
    },
    DeleteDomain {
        id: EntityId,
    },
    SetDomainAvailable {
        id: EntityId,
        available: bool,
    },
    SetDomainPosted {
        id: EntityId,
        posted: bool,
    },
    ImportDomains {
        path: PathBuf,
    },
    BulkAction {
        action: BulkAction,
        names: Vec<String>,
    },

    // ── Ticket operations ────────────────────────────────────────────
    MarkTicketRead {
        id: EntityId,
    },
    SellTicket {
        id: EntityId,
        request: SellTicketRequest,
    },
    CancelTicket {
        id: EntityId,
        note: Option<String>,
    },
    UpdateTicketNote {
        id: EntityId,
        note: String,
    },
    DeleteTicket {
        id: EntityId,
    },

    // ── Notifications ────────────────────────────────────────────────
    NotifyTelegram {
        message: String,
    },
}

impl Command {
    /// Which collections must be re-fetched once the command succeeds.
    pub(crate) fn refetch(&self) -> Refetch {
        match self {
            Self::CreateDomain { .. }
            | Self::CreateDomains { .. }
            | Self::UpdateDomain { .. }
            | Self::DeleteDomain { .. }
            | Self::SetDomainAvailable { .. }
            | Self::SetDomainPosted { .. }
            | Self::ImportDomains { .. }
            | Self::BulkAction { .. } => Refetch::Domains,
            Self::MarkTicketRead { .. }
            | Self::CancelTicket { .. }
            | Self::UpdateTicketNote { .. }
            | Self::DeleteTicket { .. } => Refetch::Tickets,
            // Selling a ticket may flip listings to sold as well.
            Self::SellTicket { .. } => Refetch::Both,
            Self::NotifyTelegram { .. } => Refetch::Nothing,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Refetch {
    Nothing,
    Domains,
    Tickets,
    Both,
}

/// Result of a command execution.
#[derive(Debug, Clone)]
pub enum CommandResult {
    Ok,
    Domain(Domain),
    Created(CreateDomainsReport),
    Imported(ImportOutcome),
    Bulk(BulkActionResult),
    Notified(serde_json::Value),
}
