// domainboard-api: Async Rust client for the domainboard listings and tickets API

pub mod auth;
pub mod client;
pub mod domains;
pub mod error;
pub mod models;
pub mod telegram;
pub mod tickets;
pub mod transport;
pub mod websocket;

pub use client::ApiClient;
pub use error::Error;
pub use models::{
    BulkAction, BulkActionResult, CreateDomainsRequest, CreateDomainsResult, DomainPayload,
    DomainRecord, ImportOutcome, ImportSummary, RowError, RowRef, SoldDomain, SoldTicketRequest,
    TicketRecord, WireId,
};
pub use transport::{TlsMode, TransportConfig};
pub use websocket::{PushEvent, ReconnectConfig, WebSocketHandle};
