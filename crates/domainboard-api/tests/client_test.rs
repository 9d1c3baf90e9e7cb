#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use domainboard_api::{
    ApiClient, BulkAction, CreateDomainsRequest, DomainPayload, Error, SoldDomain,
    SoldTicketRequest,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/api", server.uri())).unwrap();
    let client = ApiClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

async fn logged_in() -> (MockServer, ApiClient) {
    let (server, client) = setup().await;
    client.set_token("tok-123".to_string().into());
    (server, client)
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn login_stores_token_for_later_requests() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "username": "admin", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "abc" })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/tickets/count/new"))
        .and(header("authorization", "Bearer abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": 3 })))
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "pw".to_string().into();
    client.login("admin", &secret).await.unwrap();
    assert!(client.has_token());
    assert_eq!(client.new_ticket_count().await.unwrap(), 3);
}

#[tokio::test]
async fn login_failure_is_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "Invalid credentials" })),
        )
        .mount(&server)
        .await;

    let secret: secrecy::SecretString = "wrong".to_string().into();
    let result = client.login("admin", &secret).await;

    match result {
        Err(Error::Authentication { message }) => assert_eq!(message, "Invalid credentials"),
        other => panic!("expected Authentication error, got: {other:?}"),
    }
    assert!(!client.has_token());
}

#[tokio::test]
async fn unauthorized_clears_token() {
    let (server, client) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/api/domains"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.list_domains().await;
    assert!(matches!(result, Err(Error::SessionExpired)), "got {result:?}");
    assert!(!client.has_token());
}

// ── Domains ─────────────────────────────────────────────────────────

#[tokio::test]
async fn list_domains_unwraps_envelope() {
    let (server, client) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/api/domains"))
        .and(header("authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                { "_id": "d1", "domainName": "shop.io", "da": 40, "status": true },
                { "id": 2, "domainName": "news.org", "price": "15" }
            ]
        })))
        .mount(&server)
        .await;

    let domains = client.list_domains().await.unwrap();
    assert_eq!(domains.len(), 2);
    assert_eq!(domains[0].id().unwrap().to_string(), "d1");
    assert_eq!(domains[1].domain_name.as_deref(), Some("news.org"));
}

#[tokio::test]
async fn create_many_sends_shared_credentials() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/api/domains/multiple"))
        .and(body_json(json!({
            "domains": [{ "domainName": "a.com", "country": "US", "category": "GOV", "price": 10.0 }],
            "panelLink": "https://panel",
            "panelUsername": "root"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "data": { "created": [{ "_id": "n1", "domainName": "a.com" }], "errors": [] }
        })))
        .mount(&server)
        .await;

    let request = CreateDomainsRequest {
        domains: vec![DomainPayload {
            domain_name: Some("a.com".into()),
            country: Some("US".into()),
            category: Some("GOV".into()),
            price: Some(10.0),
            ..DomainPayload::default()
        }],
        panel_link: Some("https://panel".into()),
        panel_username: Some("root".into()),
        ..CreateDomainsRequest::default()
    };

    let result = client.create_domains(&request).await.unwrap();
    assert_eq!(result.created.len(), 1);
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn duplicate_domain_is_conflict() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/api/domains"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({ "message": "Domain already exists" })),
        )
        .mount(&server)
        .await;

    let result = client.create_domain(&DomainPayload::default()).await;
    match result {
        Err(Error::Conflict { message }) => assert_eq!(message, "Domain already exists"),
        other => panic!("expected Conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn state_toggles_hit_their_paths() {
    let (server, client) = logged_in().await;

    for action in ["sold", "available", "post", "unpost"] {
        Mock::given(method("PATCH"))
            .and(path(format!("/api/domains/d9/{action}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;
    }

    client.mark_domain_sold("d9").await.unwrap();
    client.mark_domain_available("d9").await.unwrap();
    client.post_domain_to_channel("d9").await.unwrap();
    client.remove_domain_from_channel("d9").await.unwrap();
}

#[tokio::test]
async fn missing_domain_is_not_found() {
    let (server, client) = logged_in().await;

    Mock::given(method("DELETE"))
        .and(path("/api/domains/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Domain not found" })))
        .mount(&server)
        .await;

    let err = client.delete_domain("nope").await.unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");
    assert_eq!(err.to_string(), "API error (HTTP 404): Domain not found");
}

#[tokio::test]
async fn import_uploads_multipart_and_reads_report() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/api/domains/import"))
        .and(header_exists("content-type"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Import completed",
            "summary": { "totalRows": 3, "successful": 1, "duplicates": 1, "errors": 1 },
            "details": {
                "successful": [{ "row": 2, "domainName": "new.com" }],
                "duplicates": [{ "row": 3, "domainName": "old.com" }],
                "errors": [{ "row": 4, "error": "Price is required", "data": {} }]
            }
        })))
        .mount(&server)
        .await;

    let report = client
        .import_domains_bytes(b"Domain Name,Country\nnew.com,US\n".to_vec(), "d.csv".into())
        .await
        .unwrap();

    assert_eq!(report.summary.total_rows, 3);
    assert_eq!(report.details.successful[0].domain_name, "new.com");
    assert_eq!(report.details.duplicates[0].row, 3);
    assert_eq!(report.details.errors[0].error, "Price is required");

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0].headers.get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"), "{content_type}");
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"csvFile\""), "{body}");
}

#[tokio::test]
async fn bulk_action_sends_action_and_names() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/api/domains/bulk-actions"))
        .and(body_json(json!({ "action": "postToChannel", "domainNames": ["a.com", "b.com"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "successful": 1, "failed": 1, "results": [] }
        })))
        .mount(&server)
        .await;

    let names = vec!["a.com".to_string(), "b.com".to_string()];
    let result = client.bulk_action(BulkAction::PostToChannel, &names).await.unwrap();
    assert_eq!((result.successful, result.failed), (1, 1));
}

// ── Tickets ─────────────────────────────────────────────────────────

#[tokio::test]
async fn list_tickets_accepts_bare_arrays() {
    let (server, client) = logged_in().await;

    Mock::given(method("GET"))
        .and(path("/api/tickets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "t1", "customer_id": 555, "request_domains": ["a.com"], "status": "New" }
        ])))
        .mount(&server)
        .await;

    let tickets = client.list_tickets().await.unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].customer_id, Some(json!(555)));
}

#[tokio::test]
async fn sold_ticket_sends_price_domains_and_note() {
    let (server, client) = logged_in().await;

    Mock::given(method("PATCH"))
        .and(path("/api/tickets/t1/sold"))
        .and(body_json(json!({
            "price": 99.5,
            "soldDomains": [{ "domain": "a.com", "sold": true }],
            "note": "paid in USDT"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let request = SoldTicketRequest {
        price: 99.5,
        sold_domains: Some(vec![SoldDomain {
            domain: "a.com".into(),
            sold: true,
        }]),
        note: Some("paid in USDT".into()),
    };
    client.mark_ticket_sold("t1", &request).await.unwrap();
}

#[tokio::test]
async fn cancel_and_note_bodies() {
    let (server, client) = logged_in().await;

    Mock::given(method("PATCH"))
        .and(path("/api/tickets/t2/cancelled"))
        .and(body_json(json!({ "note": "changed mind" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/tickets/t2/note"))
        .and(body_json(json!({ "note": "follow up friday" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.mark_ticket_cancelled("t2", Some("changed mind")).await.unwrap();
    client.update_ticket_note("t2", "follow up friday").await.unwrap();
}

// ── Telegram ────────────────────────────────────────────────────────

#[tokio::test]
async fn telegram_notify_posts_message() {
    let (server, client) = logged_in().await;

    Mock::given(method("POST"))
        .and(path("/api/telegram/notify"))
        .and(body_json(json!({ "message": "3 new listings" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "sent": true } })))
        .mount(&server)
        .await;

    let resp = client.send_telegram_notification("3 new listings").await.unwrap();
    assert_eq!(resp, json!({ "sent": true }));
}
