// ── API-to-domain type conversions ──
//
// Bridges raw `domainboard_api` wire records into canonical model types.
// This is the single validation pass: every loose field is coerced here
// (numbers from numeric strings, booleans from "true"/1, lenient dates)
// so nothing downstream has to handle absent or mixed-type values.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;
use tracing::trace;

use domainboard_api::{DomainPayload, DomainRecord, TicketRecord};

use crate::model::{Category, Domain, DomainName, EntityId, PanelType, Ticket, TicketStatus};

// ── Helpers ────────────────────────────────────────────────────────

/// Parse a timestamp in any of the shapes the server produces.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` (UTC) and bare `YYYY-MM-DD`
/// (UTC midnight). Anything else yields `None`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn timestamp(raw: Option<&String>) -> Option<DateTime<Utc>> {
    let parsed = raw.and_then(|s| parse_timestamp(s));
    if parsed.is_none() {
        if let Some(s) = raw {
            trace!(value = %s, "unparsable timestamp, treating as absent");
        }
    }
    parsed
}

/// Coerce a loose JSON number (or numeric string) to `f64`, defaulting to 0.
pub(crate) fn loose_f64(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Coerce to `i64`, truncating fractional values, defaulting to 0.
pub(crate) fn loose_i64(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(f64_to_i64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(f64_to_i64))
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn loose_u64(value: Option<&Value>) -> u64 {
    u64::try_from(loose_i64(value)).unwrap_or(0)
}

#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
pub(crate) fn f64_to_i64(f: f64) -> Option<i64> {
    f.is_finite().then(|| f.trunc() as i64)
}

/// Coerce a loose boolean, defaulting to `false`.
pub(crate) fn loose_bool(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => parse_bool_word(s).unwrap_or(false),
        _ => false,
    }
}

/// Boolean-like words: true/false, yes/no, 1/0.
pub(crate) fn parse_bool_word(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn text(value: Option<String>) -> String {
    value.map(|s| s.trim().to_owned()).unwrap_or_default()
}

fn customer_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

// ── Domain ─────────────────────────────────────────────────────────

impl From<DomainRecord> for Domain {
    fn from(r: DomainRecord) -> Self {
        let id = r.id().map(EntityId::from).unwrap_or_else(|| EntityId::from(""));
        Self {
            id,
            domain_name: DomainName::new(r.domain_name.unwrap_or_default()),
            country: text(r.country),
            category: Category::from(r.category.unwrap_or_default()),
            panel_type: PanelType::from(r.panel_type.unwrap_or_default()),
            da: loose_i64(r.da.as_ref()),
            pa: loose_i64(r.pa.as_ref()),
            ss: loose_i64(r.ss.as_ref()),
            backlink: loose_u64(r.backlink.as_ref()),
            price: loose_f64(r.price.as_ref()).max(0.0),
            status: loose_bool(r.status.as_ref()),
            good_link: r.good_link.unwrap_or_default(),
            panel_link: r.panel_link.unwrap_or_default(),
            panel_username: r.panel_username.unwrap_or_default(),
            panel_password: r.panel_password.unwrap_or_default(),
            hosting_link: r.hosting_link.unwrap_or_default(),
            hosting_username: r.hosting_username.unwrap_or_default(),
            hosting_password: r.hosting_password.unwrap_or_default(),
            ischannel: loose_bool(r.ischannel.as_ref()),
            post_date_time: timestamp(r.post_date_time.as_ref()),
            created_at: timestamp(r.created_at.as_ref()),
            updated_at: timestamp(r.updated_at.as_ref()),
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_owned()) }
}

/// Full editable state of a listing, for `PUT /domains/{id}`.
impl From<&Domain> for DomainPayload {
    fn from(d: &Domain) -> Self {
        Self {
            domain_name: Some(d.domain_name.to_string()),
            country: Some(d.country.clone()),
            category: non_empty(d.category.as_str()),
            panel_type: Some(d.panel_type.to_string()),
            da: Some(d.da),
            pa: Some(d.pa),
            ss: Some(d.ss),
            backlink: Some(d.backlink),
            price: Some(d.price),
            status: Some(d.status),
            good_link: Some(d.good_link.clone()),
            ischannel: Some(d.ischannel),
            panel_link: Some(d.panel_link.clone()),
            panel_username: Some(d.panel_username.clone()),
            panel_password: Some(d.panel_password.clone()),
            hosting_link: Some(d.hosting_link.clone()),
            hosting_username: Some(d.hosting_username.clone()),
            hosting_password: Some(d.hosting_password.clone()),
        }
    }
}

// ── Ticket ─────────────────────────────────────────────────────────

impl From<TicketRecord> for Ticket {
    fn from(r: TicketRecord) -> Self {
        let id = r.id().map(EntityId::from).unwrap_or_else(|| EntityId::from(""));
        let status = r
            .status
            .as_deref()
            .and_then(|s| s.trim().parse::<TicketStatus>().ok())
            .unwrap_or_default();
        let price = r
            .price
            .as_ref()
            .filter(|v| !v.is_null())
            .map(|v| loose_f64(Some(v)));
        Self {
            id,
            customer_id: customer_text(r.customer_id.as_ref()),
            request_domains: r.request_domains.unwrap_or_default(),
            request_time: timestamp(r.request_time.as_ref()),
            status,
            price,
            note: r.note.unwrap_or_default(),
            created_at: timestamp(r.created_at.as_ref()),
            updated_at: timestamp(r.updated_at.as_ref()),
        }
    }
}
