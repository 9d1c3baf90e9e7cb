// ── Command request types ──

use serde::{Deserialize, Serialize};

use domainboard_api::{CreateDomainsRequest, DomainPayload, SoldDomain, SoldTicketRequest};

use crate::model::Domain;

/// Panel and hosting credentials applied to every listing in a batch.
///
/// Empty fields are left off the request so per-listing values survive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedAccess {
    pub panel_link: String,
    pub panel_username: String,
    pub panel_password: String,
    pub hosting_link: String,
    pub hosting_username: String,
    pub hosting_password: String,
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() { None } else { Some(s.to_owned()) }
}

impl SharedAccess {
    pub(crate) fn into_request(self, domains: &[Domain]) -> CreateDomainsRequest {
        CreateDomainsRequest {
            domains: domains.iter().map(DomainPayload::from).collect(),
            panel_link: non_empty(&self.panel_link),
            panel_username: non_empty(&self.panel_username),
            panel_password: non_empty(&self.panel_password),
            hosting_link: non_empty(&self.hosting_link),
            hosting_username: non_empty(&self.hosting_username),
            hosting_password: non_empty(&self.hosting_password),
        }
    }
}

/// Close a ticket as sold.
///
/// `sold_domains` lists which requested names were actually sold; leave
/// it empty to omit the breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SellTicketRequest {
    pub price: f64,
    pub sold_domains: Vec<(String, bool)>,
    pub note: Option<String>,
}

impl From<SellTicketRequest> for SoldTicketRequest {
    fn from(r: SellTicketRequest) -> Self {
        let sold_domains = (!r.sold_domains.is_empty()).then(|| {
            r.sold_domains
                .into_iter()
                .map(|(domain, sold)| SoldDomain { domain, sold })
                .collect()
        });
        Self {
            price: r.price,
            sold_domains,
            note: r.note.filter(|n| !n.trim().is_empty()),
        }
    }
}

/// Outcome of a batch create: listings the server stored, and the
/// per-entry errors it reported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateDomainsReport {
    pub created: Vec<Domain>,
    pub errors: Vec<serde_json::Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shared_access_omits_blank_fields() {
        let access = SharedAccess {
            panel_link: "https://cp".into(),
            panel_username: "root".into(),
            ..SharedAccess::default()
        };
        let request = access.into_request(&[Domain::default()]);
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["panelLink"], json!("https://cp"));
        assert!(body.get("hostingLink").is_none());
        assert_eq!(body["domains"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn sale_without_breakdown_omits_sold_domains() {
        let wire = SoldTicketRequest::from(SellTicketRequest {
            price: 50.0,
            sold_domains: Vec::new(),
            note: Some("  ".into()),
        });
        let body = serde_json::to_value(&wire).unwrap();
        assert_eq!(body, json!({ "price": 50.0 }));
    }
}
