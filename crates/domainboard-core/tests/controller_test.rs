#![allow(clippy::unwrap_used)]
// Controller lifecycle tests against a wiremock API.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use domainboard_core::{
    AuthCredentials, Command, CommandResult, ConnectionState, Controller, ControllerConfig,
    CoreError, EntityId, SellTicketRequest, TicketStatus,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config(server: &MockServer) -> ControllerConfig {
    let url = Url::parse(&format!("{}/api", server.uri())).unwrap();
    ControllerConfig::new(url, AuthCredentials::Token("tok".to_string().into()))
}

async fn mount_listing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/domains"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                { "_id": "d1", "domainName": "old.com", "createdAt": "2024-01-01T00:00:00Z" },
                { "_id": "d2", "domainName": "new.com", "createdAt": "2024-02-01T00:00:00Z" }
            ]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/tickets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "t1", "customer_id": "42", "request_domains": ["old.com"], "status": "New" },
            { "_id": "t2", "customer_id": "43", "request_domains": ["new.com"], "status": "Sold" }
        ])))
        .mount(server)
        .await;
}

async fn mount_count(server: &MockServer, count: u64) {
    Mock::given(method("GET"))
        .and(path("/api/tickets/count/new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "count": count })))
        .mount(server)
        .await;
}

// ── Lifecycle ───────────────────────────────────────────────────────

#[tokio::test]
async fn connect_loads_both_collections() {
    let server = MockServer::start().await;
    mount_listing(&server).await;
    mount_count(&server, 7).await;

    let controller = Controller::new(config(&server));
    controller.connect().await.unwrap();

    assert_eq!(*controller.connection_state().borrow(), ConnectionState::Connected);
    assert_eq!(controller.domains_snapshot().len(), 2);
    assert_eq!(controller.tickets_snapshot().len(), 2);
    assert_eq!(controller.new_ticket_count(), 7);
    assert_eq!(controller.domain("NEW.COM").unwrap().id, EntityId::from("d2"));
    assert!(controller.store().last_full_refresh().is_some());

    controller.disconnect().await;
    assert_eq!(
        *controller.connection_state().borrow(),
        ConnectionState::Disconnected
    );
}

#[tokio::test]
async fn missing_count_endpoint_falls_back_to_local_count() {
    let server = MockServer::start().await;
    mount_listing(&server).await;

    let controller = Controller::new(config(&server));
    controller.connect().await.unwrap();

    assert_eq!(controller.new_ticket_count(), 1);
    controller.disconnect().await;
}

#[tokio::test]
async fn failed_listing_leaves_store_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/domains"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tickets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let controller = Controller::new(config(&server));
    let err = controller.connect().await.unwrap_err();

    assert!(matches!(err, CoreError::Api { status: Some(500), .. }), "got {err:?}");
    assert_eq!(*controller.connection_state().borrow(), ConnectionState::Failed);
    assert_eq!(controller.store().domain_count(), 0);
    assert_eq!(controller.store().ticket_count(), 0);
}

#[tokio::test]
async fn password_login_exposes_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({ "username": "admin", "password": "pw" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tok" })))
        .mount(&server)
        .await;
    mount_listing(&server).await;
    mount_count(&server, 0).await;

    let mut cfg = config(&server);
    cfg.auth = AuthCredentials::Credentials {
        username: "admin".into(),
        password: "pw".to_string().into(),
    };

    let controller = Controller::new(cfg);
    controller.connect().await.unwrap();
    assert!(controller.token().await.is_some());
    controller.disconnect().await;
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn execute_requires_connection() {
    let server = MockServer::start().await;
    let controller = Controller::new(config(&server));

    let err = controller
        .execute(Command::DeleteDomain { id: "d1".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Disconnected));
}

#[tokio::test]
async fn deleting_a_domain_refetches_listings() {
    let server = MockServer::start().await;
    // First fetch sees both listings; every later fetch sees only d2.
    Mock::given(method("GET"))
        .and(path("/api/domains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "d1", "domainName": "old.com" },
            { "_id": "d2", "domainName": "new.com" }
        ])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/domains"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "d2", "domainName": "new.com" }
        ])))
        .mount(&server)
        .await;
    mount_listing(&server).await;
    mount_count(&server, 1).await;

    Mock::given(method("DELETE"))
        .and(path("/api/domains/d1"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let controller = Controller::new(config(&server));
    controller.connect().await.unwrap();
    assert_eq!(controller.domains_snapshot().len(), 2);

    let result = controller
        .execute(Command::DeleteDomain { id: "d1".into() })
        .await
        .unwrap();
    assert!(matches!(result, CommandResult::Ok));
    assert_eq!(controller.domains_snapshot().len(), 1);
    assert!(controller.domain("old.com").is_err());

    controller.disconnect().await;
    let err = controller
        .execute(Command::DeleteDomain { id: "d2".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Disconnected));
}

#[tokio::test]
async fn selling_a_ticket_refetches_both_collections() {
    let server = MockServer::start().await;
    mount_listing(&server).await;
    mount_count(&server, 1).await;

    Mock::given(method("PATCH"))
        .and(path("/api/tickets/t1/sold"))
        .and(body_json(json!({ "price": 120.0 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let result = Controller::oneshot(config(&server), |c| async move {
        c.execute(Command::SellTicket {
            id: "t1".into(),
            request: SellTicketRequest {
                price: 120.0,
                sold_domains: Vec::new(),
                note: None,
            },
        })
        .await
    })
    .await
    .unwrap();

    assert!(matches!(result, CommandResult::Ok));
}

#[tokio::test]
async fn terminal_ticket_refuses_transition() {
    let server = MockServer::start().await;
    mount_listing(&server).await;
    mount_count(&server, 1).await;

    let err = Controller::oneshot(config(&server), |c| async move {
        assert_eq!(c.ticket("t2")?.status, TicketStatus::Sold);
        c.execute(Command::CancelTicket {
            id: "t2".into(),
            note: None,
        })
        .await
    })
    .await
    .unwrap_err();

    assert!(matches!(err, CoreError::InvalidTransition { .. }), "got {err:?}");
}

#[tokio::test]
async fn unknown_ticket_is_not_found() {
    let server = MockServer::start().await;
    mount_listing(&server).await;
    mount_count(&server, 1).await;

    let err = Controller::oneshot(config(&server), |c| async move { c.ticket("zzz").map(|_| ()) })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { entity_type: "Ticket", .. }));
}

#[tokio::test]
async fn authenticate_exchanges_password_for_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "fresh" })))
        .expect(1)
        .mount(&server)
        .await;

    let mut cfg = config(&server);
    cfg.auth = AuthCredentials::Credentials {
        username: "admin".into(),
        password: "pw".to_string().into(),
    };

    let token = Controller::authenticate(&cfg).await.unwrap();
    assert_eq!(secrecy::ExposeSecret::expose_secret(&token), "fresh");
}
