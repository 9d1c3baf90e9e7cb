//! Listing and ticket engine between `domainboard-api` and the CLI.
//!
//! - **[`Controller`]**: session lifecycle. [`connect()`](Controller::connect)
//!   authenticates, loads listings and tickets, then spawns the command
//!   processor and (optionally) the pushed-ticket listener.
//!   [`Controller::oneshot()`](Controller::oneshot) runs a single request
//!   cycle for CLI invocations.
//!
//! - **[`DataStore`]**: in-memory storage built on `DashMap` and
//!   `tokio::sync::watch`. Fetches replace whole collections; pushed
//!   tickets are prepended.
//!
//! - **[`query`]**: the filter, sort, paginate pipeline over in-memory
//!   records, plus [`QueryView`] for interactive state.
//!
//! - **[`csv`]**: export schemas, the import template, and the dry-run
//!   import parser.
//!
//! - **[`lookup`]**: same-panel grouping and bulk name search.
//!
//! - **[`Command`]**: typed mutations routed through an `mpsc` channel to
//!   the controller, which re-fetches whatever a mutation touched.

pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod csv;
pub mod error;
pub mod lookup;
pub mod model;
pub mod query;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult, CreateDomainsReport, SellTicketRequest, SharedAccess};
pub use config::{AuthCredentials, ControllerConfig, TlsVerification};
pub use controller::{ConnectionState, Controller};
pub use error::CoreError;
pub use lookup::{SearchReport, SearchRow, bulk_search, bulk_search_chunked, same_panel};
pub use query::{
    DateRange, DomainColumn, DomainFilter, NumericRange, PageSpec, QueryResult, QueryView,
    SortOrder, SortSpec, TicketColumn, TicketFilter, run_query,
};
pub use store::DataStore;

pub use model::{
    Category, Domain, DomainName, EntityId, PanelType, Ticket, TicketStatus, normalize_domain_name,
};

// Wire types that surface in command results.
pub use domainboard_api::{BulkAction, BulkActionResult, ImportOutcome, ImportSummary};
pub use secrecy::SecretString;
