// Ticket endpoints
//
// Listing, lifecycle transitions and notes under `/tickets`.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{CountResponse, NoteRequest, SoldTicketRequest, TicketRecord};

impl ApiClient {
    /// List every ticket.
    ///
    /// `GET /tickets`
    pub async fn list_tickets(&self) -> Result<Vec<TicketRecord>, Error> {
        let tickets: Option<Vec<TicketRecord>> = self.get("tickets").await?;
        let tickets = tickets.unwrap_or_default();
        debug!(count = tickets.len(), "fetched tickets");
        Ok(tickets)
    }

    /// Number of tickets still in the `New` state.
    ///
    /// `GET /tickets/count/new`
    pub async fn new_ticket_count(&self) -> Result<u64, Error> {
        let resp: CountResponse = self.get("tickets/count/new").await?;
        Ok(resp.count)
    }

    /// `PATCH /tickets/{id}/read`
    pub async fn mark_ticket_read(&self, id: &str) -> Result<(), Error> {
        debug!(id, "marking ticket read");
        let _: serde_json::Value = self
            .patch(&format!("tickets/{id}/read"), None::<&()>)
            .await?;
        Ok(())
    }

    /// `PATCH /tickets/{id}/sold`
    pub async fn mark_ticket_sold(&self, id: &str, request: &SoldTicketRequest) -> Result<(), Error> {
        debug!(id, price = request.price, "marking ticket sold");
        let _: serde_json::Value = self
            .patch(&format!("tickets/{id}/sold"), Some(request))
            .await?;
        Ok(())
    }

    /// `PATCH /tickets/{id}/cancelled`
    pub async fn mark_ticket_cancelled(&self, id: &str, note: Option<&str>) -> Result<(), Error> {
        debug!(id, "cancelling ticket");
        let _: serde_json::Value = self
            .patch(&format!("tickets/{id}/cancelled"), Some(&NoteRequest { note }))
            .await?;
        Ok(())
    }

    /// Replace a ticket's note without touching its status.
    ///
    /// `PATCH /tickets/{id}/note`
    pub async fn update_ticket_note(&self, id: &str, note: &str) -> Result<(), Error> {
        debug!(id, "updating ticket note");
        let _: serde_json::Value = self
            .patch(&format!("tickets/{id}/note"), Some(&NoteRequest { note: Some(note) }))
            .await?;
        Ok(())
    }

    /// `DELETE /tickets/{id}`
    pub async fn delete_ticket(&self, id: &str) -> Result<(), Error> {
        debug!(id, "deleting ticket");
        self.delete(&format!("tickets/{id}")).await
    }
}
