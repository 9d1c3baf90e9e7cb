// Wire types for the listings API.
//
// Response records are deliberately loose: the server omits fields, sends
// nulls, and mixes numbers with numeric strings. `domainboard-core` owns the
// validation pass that turns these into strict domain types.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Identifiers ─────────────────────────────────────────────────────

/// A server-assigned record id. Some deployments send strings, some numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Text(String),
    Number(i64),
}

impl fmt::Display for WireId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
        }
    }
}

// ── Domains ─────────────────────────────────────────────────────────

/// A domain listing as returned by `GET /domains`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DomainRecord {
    pub id: Option<WireId>,
    #[serde(rename = "_id")]
    pub object_id: Option<WireId>,
    pub domain_name: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub panel_type: Option<String>,
    pub da: Option<Value>,
    pub pa: Option<Value>,
    pub ss: Option<Value>,
    pub backlink: Option<Value>,
    pub price: Option<Value>,
    pub status: Option<Value>,
    pub good_link: Option<String>,
    pub panel_link: Option<String>,
    pub panel_username: Option<String>,
    pub panel_password: Option<String>,
    pub hosting_link: Option<String>,
    pub hosting_username: Option<String>,
    pub hosting_password: Option<String>,
    pub ischannel: Option<Value>,
    pub post_date_time: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl DomainRecord {
    /// The record id, whichever of `id` / `_id` the server sent.
    pub fn id(&self) -> Option<&WireId> {
        self.id.as_ref().or(self.object_id.as_ref())
    }
}

/// Body for creating or updating a single domain.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DomainPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub panel_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub da: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pa: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ss: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backlink: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub good_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ischannel: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosting_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosting_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosting_password: Option<String>,
}

/// Body for `POST /domains/multiple`.
///
/// Panel and hosting credentials are shared by every listing in the batch.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDomainsRequest {
    pub domains: Vec<DomainPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub panel_password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosting_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosting_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosting_password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CreateDomainsResult {
    pub created: Vec<DomainRecord>,
    pub errors: Vec<Value>,
}

// ── Import ──────────────────────────────────────────────────────────

/// Server report for `POST /domains/import`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOutcome {
    pub summary: ImportSummary,
    pub details: ImportDetails,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ImportSummary {
    pub total_rows: u64,
    pub successful: u64,
    pub duplicates: u64,
    pub errors: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportDetails {
    pub successful: Vec<RowRef>,
    pub duplicates: Vec<RowRef>,
    pub errors: Vec<RowError>,
}

/// A CSV row that was added (or skipped as a duplicate).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct RowRef {
    pub row: u64,
    pub domain_name: String,
}

/// A CSV row the server refused, with its reason.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RowError {
    pub row: u64,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

// ── Bulk actions ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BulkAction {
    MarkSold,
    MarkAvailable,
    PostToChannel,
    RemoveFromChannel,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BulkActionRequest<'a> {
    pub action: BulkAction,
    pub domain_names: &'a [String],
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkActionResult {
    pub successful: u64,
    pub failed: u64,
    pub results: Vec<Value>,
}

// ── Tickets ─────────────────────────────────────────────────────────

/// A purchase request as returned by `GET /tickets`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketRecord {
    pub id: Option<WireId>,
    #[serde(rename = "_id")]
    pub object_id: Option<WireId>,
    pub customer_id: Option<Value>,
    pub request_domains: Option<Vec<String>>,
    pub request_time: Option<String>,
    pub status: Option<String>,
    pub price: Option<Value>,
    pub note: Option<String>,
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<String>,
}

impl TicketRecord {
    pub fn id(&self) -> Option<&WireId> {
        self.id.as_ref().or(self.object_id.as_ref())
    }
}

/// Per-domain outcome sent along with a sold ticket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SoldDomain {
    pub domain: String,
    pub sold: bool,
}

/// Body for `PATCH /tickets/{id}/sold`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoldTicketRequest {
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sold_domains: Option<Vec<SoldDomain>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct NoteRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<&'a str>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CountResponse {
    pub count: u64,
}
