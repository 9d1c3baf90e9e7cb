// ── Controller abstraction ──
//
// Full lifecycle management for an API session. Handles
// authentication, data refresh, command routing, and the optional
// pushed-ticket stream feeding the DataStore.

use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use domainboard_api::websocket::{PushEvent, ReconnectConfig, WebSocketHandle, derive_ws_url};
use domainboard_api::{ApiClient, DomainPayload, SoldTicketRequest, TlsMode, TransportConfig};

use crate::command::{Command, CommandEnvelope, CommandResult, CreateDomainsReport, Refetch};
use crate::config::{AuthCredentials, ControllerConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{Domain, EntityId, Ticket, TicketStatus};
use crate::store::DataStore;

const COMMAND_CHANNEL_SIZE: usize = 64;
const EVENT_CHANNEL_SIZE: usize = 256;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Manages the session
/// lifecycle: login, data refresh, command routing, and the pushed
/// ticket stream.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    store: Arc<DataStore>,
    connection_state: watch::Sender<ConnectionState>,
    /// Tickets announced by the server, after they reach the store.
    ticket_tx: broadcast::Sender<Arc<Ticket>>,
    command_tx: Mutex<mpsc::Sender<CommandEnvelope>>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    /// Child token for the current session, cancelled on disconnect,
    /// replaced on reconnect.
    cancel_child: Mutex<CancellationToken>,
    client: Mutex<Option<Arc<ApiClient>>>,
    ws_handle: Mutex<Option<WebSocketHandle>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Create a new Controller from configuration. Does NOT connect --
    /// call [`connect()`](Self::connect) to authenticate and load data.
    pub fn new(config: ControllerConfig) -> Self {
        let store = Arc::new(DataStore::new());
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (ticket_tx, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(ControllerInner {
                config,
                store,
                connection_state,
                ticket_tx,
                command_tx: Mutex::new(command_tx),
                command_rx: Mutex::new(Some(command_rx)),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                client: Mutex::new(None),
                ws_handle: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the controller configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// Access the underlying DataStore.
    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Authenticate, load listings and tickets, and start the command
    /// processor (plus the push listener when enabled).
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.inner
            .connection_state
            .send_replace(ConnectionState::Connecting);

        match self.establish().await {
            Ok(()) => {
                self.inner
                    .connection_state
                    .send_replace(ConnectionState::Connected);
                info!(url = %self.inner.config.url, "connected");
                Ok(())
            }
            Err(e) => {
                self.inner.connection_state.send_replace(ConnectionState::Failed);
                Err(e)
            }
        }
    }

    async fn establish(&self) -> Result<(), CoreError> {
        // Fresh child token for this session (supports reconnect).
        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        let config = &self.inner.config;
        let client = ApiClient::new(config.url.clone(), &build_transport(config))?;

        match &config.auth {
            AuthCredentials::Token(token) => {
                client.set_token(token.clone());
                debug!("using stored bearer token");
            }
            AuthCredentials::Credentials { username, password } => {
                client.login(username, password).await?;
                debug!(username = %username, "password login successful");
            }
        }

        *self.inner.client.lock().await = Some(Arc::new(client));

        // Initial data load
        self.full_refresh().await?;

        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let ctrl = self.clone();
            handles.push(tokio::spawn(command_processor_task(ctrl, rx)));
        }

        if config.websocket_enabled {
            self.spawn_websocket(&child, &mut handles).await;
        }
        Ok(())
    }

    /// Spawn the push stream and a bridge task that moves announced
    /// tickets into the store and rebroadcasts them.
    ///
    /// Non-fatal on failure: data is still current as of the last fetch.
    async fn spawn_websocket(&self, cancel: &CancellationToken, handles: &mut Vec<JoinHandle<()>>) {
        let ws_url = match &self.inner.config.websocket_url {
            Some(url) => url.clone(),
            None => match derive_ws_url(&self.inner.config.url) {
                Ok(url) => url,
                Err(e) => {
                    warn!(error = %e, "cannot derive push URL, live updates disabled");
                    return;
                }
            },
        };

        let token = self.token().await;
        let ws_cancel = cancel.child_token();
        let handle =
            WebSocketHandle::connect(ws_url.clone(), ReconnectConfig::default(), ws_cancel.clone(), token);

        let mut ws_rx = handle.subscribe();
        let ticket_tx = self.inner.ticket_tx.clone();
        let store = Arc::clone(&self.inner.store);

        handles.push(tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = ws_cancel.cancelled() => break,
                    result = ws_rx.recv() => {
                        match result {
                            Ok(event) => match &*event {
                                PushEvent::NewTicket { ticket } => {
                                    let ticket = Ticket::from(ticket.clone());
                                    info!(id = %ticket.id, customer = %ticket.customer_id, "new ticket pushed");
                                    store.upsert_ticket(ticket.clone());
                                    let _ = ticket_tx.send(Arc::new(ticket));
                                }
                            },
                            Err(broadcast::error::RecvError::Lagged(n)) => {
                                warn!(skipped = n, "push bridge: receiver lagged");
                            }
                            Err(broadcast::error::RecvError::Closed) => break,
                        }
                    }
                }
            }
        }));

        *self.inner.ws_handle.lock().await = Some(handle);
        info!(url = %ws_url, "push stream spawned (handshake in progress)");
    }

    /// Cancel background tasks, drop the session and reset the state to
    /// [`Disconnected`](ConnectionState::Disconnected).
    pub async fn disconnect(&self) {
        // Cancel the child token (not the parent, so reconnect works).
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        if let Some(handle) = self.inner.ws_handle.lock().await.take() {
            handle.shutdown();
        }

        *self.inner.client.lock().await = None;

        // Recreate command channel so reconnects can spawn a fresh receiver.
        {
            let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
            *self.inner.command_tx.lock().await = tx;
            *self.inner.command_rx.lock().await = Some(rx);
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Fetch listings and tickets concurrently and replace both
    /// collections. The store is untouched unless both fetches succeed.
    pub async fn full_refresh(&self) -> Result<(), CoreError> {
        let client = self.client().await?;

        let (domains_res, tickets_res, count_res) = tokio::join!(
            client.list_domains(),
            client.list_tickets(),
            client.new_ticket_count(),
        );

        let domains: Vec<Domain> = domains_res?.into_iter().map(Domain::from).collect();
        let tickets: Vec<Ticket> = tickets_res?.into_iter().map(Ticket::from).collect();
        info!(
            domains = domains.len(),
            tickets = tickets.len(),
            "full refresh complete"
        );

        let store = &self.inner.store;
        store.apply_domains(domains);
        store.apply_tickets(tickets);
        if let Some(count) = or_warn("tickets/count/new", count_res) {
            store.set_new_ticket_count(count);
        }
        store.mark_refreshed();
        Ok(())
    }

    /// Re-fetch listings only.
    pub async fn refresh_domains(&self) -> Result<(), CoreError> {
        let client = self.client().await?;
        let domains = client.list_domains().await?;
        self.inner
            .store
            .apply_domains(domains.into_iter().map(Domain::from).collect());
        Ok(())
    }

    /// Re-fetch tickets only.
    pub async fn refresh_tickets(&self) -> Result<(), CoreError> {
        let client = self.client().await?;
        let tickets = client.list_tickets().await?;
        self.inner
            .store
            .apply_tickets(tickets.into_iter().map(Ticket::from).collect());
        Ok(())
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a command against the API.
    ///
    /// Sends the command through the internal channel to the command
    /// processor task and awaits the result. On success the affected
    /// collection has already been re-fetched.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::Disconnected);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();

        let command_tx = self.inner.command_tx.lock().await.clone();

        command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::Disconnected)?;

        rx.await.map_err(|_| CoreError::Disconnected)?
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: connect, run closure, disconnect.
    ///
    /// Optimized for CLI: disables the push stream since we only need a
    /// single request-response cycle.
    pub async fn oneshot<F, Fut, T>(config: ControllerConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.websocket_enabled = false;

        let controller = Controller::new(cfg);
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.disconnect().await;
        result
    }

    /// Exchange the configured credentials for a bearer token without
    /// loading any data. A configured token is returned unchanged.
    pub async fn authenticate(config: &ControllerConfig) -> Result<SecretString, CoreError> {
        match &config.auth {
            AuthCredentials::Token(token) => Ok(token.clone()),
            AuthCredentials::Credentials { username, password } => {
                let client = ApiClient::new(config.url.clone(), &build_transport(config))?;
                let token = client.login(username, password).await?;
                info!(username = %username, "logged in");
                Ok(token)
            }
        }
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// Subscribe to tickets announced over the push stream.
    pub fn new_tickets(&self) -> broadcast::Receiver<Arc<Ticket>> {
        self.inner.ticket_tx.subscribe()
    }

    /// The session's bearer token, e.g. to persist after a password login.
    pub async fn token(&self) -> Option<SecretString> {
        self.inner
            .client
            .lock()
            .await
            .as_ref()
            .and_then(|c| c.token())
    }

    // ── Snapshot accessors (delegate to DataStore) ───────────────

    pub fn domains_snapshot(&self) -> Arc<Vec<Arc<Domain>>> {
        self.inner.store.domains_snapshot()
    }

    pub fn tickets_snapshot(&self) -> Arc<Vec<Arc<Ticket>>> {
        self.inner.store.tickets_snapshot()
    }

    /// A listing by id, or by name when no id matches.
    pub fn domain(&self, key: &str) -> Result<Arc<Domain>, CoreError> {
        let store = &self.inner.store;
        store
            .domain_by_id(&EntityId::from(key))
            .or_else(|| store.domain_by_name(key))
            .ok_or_else(|| CoreError::domain_not_found(key))
    }

    pub fn ticket(&self, id: &str) -> Result<Arc<Ticket>, CoreError> {
        self.inner
            .store
            .ticket_by_id(&EntityId::from(id))
            .ok_or_else(|| CoreError::ticket_not_found(id))
    }

    /// Unread tickets according to the server (or the local count).
    pub fn new_ticket_count(&self) -> u64 {
        self.inner.store.new_ticket_count()
    }

    async fn client(&self) -> Result<Arc<ApiClient>, CoreError> {
        self.inner
            .client
            .lock()
            .await
            .as_ref()
            .map(Arc::clone)
            .ok_or(CoreError::Disconnected)
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Process commands from the mpsc channel, one at a time.
async fn command_processor_task(controller: Controller, mut rx: mpsc::Receiver<CommandEnvelope>) {
    let cancel = controller.inner.cancel_child.lock().await.clone();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&controller, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

/// Route a command to its endpoint, then re-fetch what it touched.
async fn route_command(controller: &Controller, cmd: Command) -> Result<CommandResult, CoreError> {
    let client = controller.client().await?;
    let refetch = cmd.refetch();

    let result = match cmd {
        // ── Listing operations ───────────────────────────────────
        Command::CreateDomain { domain } => {
            let created = client.create_domain(&DomainPayload::from(&domain)).await?;
            CommandResult::Domain(Domain::from(created))
        }

        Command::CreateDomains { domains, access } => {
            let request = access.into_request(&domains);
            let outcome = client.create_domains(&request).await?;
            CommandResult::Created(CreateDomainsReport {
                created: outcome.created.into_iter().map(Domain::from).collect(),
                errors: outcome.errors,
            })
        }

        Command::UpdateDomain { id, domain } => {
            let updated = client
                .update_domain(id.as_str(), &DomainPayload::from(&domain))
                .await?;
            CommandResult::Domain(Domain::from(updated))
        }

        Command::DeleteDomain { id } => {
            client.delete_domain(id.as_str()).await?;
            CommandResult::Ok
        }

        Command::SetDomainAvailable { id, available } => {
            if available {
                client.mark_domain_available(id.as_str()).await?;
            } else {
                client.mark_domain_sold(id.as_str()).await?;
            }
            CommandResult::Ok
        }

        Command::SetDomainPosted { id, posted } => {
            if posted {
                client.post_domain_to_channel(id.as_str()).await?;
            } else {
                client.remove_domain_from_channel(id.as_str()).await?;
            }
            CommandResult::Ok
        }

        Command::ImportDomains { path } => {
            let outcome = client.import_domains_csv(&path).await?;
            info!(
                total = outcome.summary.total_rows,
                successful = outcome.summary.successful,
                duplicates = outcome.summary.duplicates,
                errors = outcome.summary.errors,
                "import finished"
            );
            CommandResult::Imported(outcome)
        }

        Command::BulkAction { action, names } => {
            if names.is_empty() {
                return Err(CoreError::ValidationFailed {
                    message: "no domain names given".into(),
                });
            }
            CommandResult::Bulk(client.bulk_action(action, &names).await?)
        }

        // ── Ticket operations ────────────────────────────────────
        Command::MarkTicketRead { id } => {
            require_transition(controller, &id, TicketStatus::Read)?;
            client.mark_ticket_read(id.as_str()).await?;
            CommandResult::Ok
        }

        Command::SellTicket { id, request } => {
            require_transition(controller, &id, TicketStatus::Sold)?;
            if !request.price.is_finite() || request.price < 0.0 {
                return Err(CoreError::ValidationFailed {
                    message: format!("invalid price {}", request.price),
                });
            }
            client
                .mark_ticket_sold(id.as_str(), &SoldTicketRequest::from(request))
                .await?;
            CommandResult::Ok
        }

        Command::CancelTicket { id, note } => {
            require_transition(controller, &id, TicketStatus::Cancelled)?;
            client.mark_ticket_cancelled(id.as_str(), note.as_deref()).await?;
            CommandResult::Ok
        }

        Command::UpdateTicketNote { id, note } => {
            client.update_ticket_note(id.as_str(), &note).await?;
            CommandResult::Ok
        }

        Command::DeleteTicket { id } => {
            client.delete_ticket(id.as_str()).await?;
            CommandResult::Ok
        }

        // ── Notifications ────────────────────────────────────────
        Command::NotifyTelegram { message } => {
            CommandResult::Notified(client.send_telegram_notification(&message).await?)
        }
    };

    match refetch {
        Refetch::Nothing => {}
        Refetch::Domains => controller.refresh_domains().await?,
        Refetch::Tickets => controller.refresh_tickets().await?,
        Refetch::Both => controller.full_refresh().await?,
    }

    Ok(result)
}

// ── Helpers ──────────────────────────────────────────────────────

/// Refuse lifecycle moves the ticket's current status does not allow.
///
/// Tickets missing from the store are left for the server to judge.
fn require_transition(
    controller: &Controller,
    id: &EntityId,
    next: TicketStatus,
) -> Result<(), CoreError> {
    match controller.inner.store.ticket_by_id(id) {
        Some(ticket) if !ticket.status.can_transition_to(next) => {
            Err(CoreError::InvalidTransition {
                from: ticket.status.to_string(),
                to: next.to_string(),
            })
        }
        _ => Ok(()),
    }
}

/// Build a [`TransportConfig`] from the controller configuration.
fn build_transport(config: &ControllerConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

/// Downgrade an optional endpoint's failure to `None` with a warning.
fn or_warn<T>(endpoint: &str, result: Result<T, domainboard_api::Error>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(ref e) if e.is_not_found() => {
            debug!("{endpoint}: not available (404), ignoring");
            None
        }
        Err(e) => {
            warn!("{endpoint}: unexpected error {e}, ignoring");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tls_modes_map_one_to_one() {
        assert!(matches!(
            tls_to_transport(&TlsVerification::SystemDefaults),
            TlsMode::System
        ));
        assert!(matches!(
            tls_to_transport(&TlsVerification::DangerAcceptInvalid),
            TlsMode::DangerAcceptInvalid
        ));
    }

    #[test]
    fn optional_endpoint_failure_is_none() {
        let missing: Result<u64, _> = Err(domainboard_api::Error::Api {
            status: 404,
            message: "nope".into(),
        });
        assert_eq!(or_warn("count", missing), None);
        assert_eq!(or_warn("count", Ok::<_, domainboard_api::Error>(4)), Some(4));
    }
}
