// HTTP client for the listings API
//
// Wraps `reqwest::Client` with URL construction, bearer-token injection,
// `{ data }` envelope unwrapping and status mapping. Endpoint groups
// (auth, domains, tickets, telegram) are inherent methods in their own
// files to keep this module focused on transport mechanics.

use std::sync::{PoisonError, RwLock};

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

const BODY_PREVIEW_CHARS: usize = 200;

/// Error body shapes the server uses: `{"message": ".."}` or `{"error": ".."}`.
#[derive(serde::Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Raw HTTP client for the listings API.
///
/// Every method returns the unwrapped payload; a `{ "data": ... }`
/// envelope is stripped before the caller sees it.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
    token: RwLock<Option<SecretString>>,
}

impl ApiClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the API root that paths like `domains` are appended to,
    /// e.g. `https://api.example.com/api`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout_secs: transport.timeout.as_secs(),
            token: RwLock::new(None),
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            timeout_secs: 30,
            token: RwLock::new(None),
        }
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── Token management ─────────────────────────────────────────────

    /// Install a bearer token (from login, config, or the keyring).
    pub fn set_token(&self, token: SecretString) {
        debug!("storing bearer token");
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    /// Drop the bearer token. Called automatically on HTTP 401.
    pub fn clear_token(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn has_token(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// A copy of the current token, for authenticating the push socket.
    pub fn token(&self) -> Option<SecretString> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}/{path}` without clobbering a path prefix on the base.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Start a request with the bearer token applied.
    pub(crate) fn request(&self, method: Method, url: Url) -> reqwest::RequestBuilder {
        debug!("{method} {url}");
        let builder = self.http.request(method, url);
        let guard = self.token.read().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a prepared request and decode the (unwrapped) body.
    pub(crate) async fn send<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, Error> {
        let resp = builder.send().await.map_err(|e| self.map_transport(e))?;
        self.parse_response(resp).await
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        self.send(self.request(Method::GET, url)).await
    }

    pub(crate) async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl serde::Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        self.send(self.request(Method::POST, url).json(body)).await
    }

    pub(crate) async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &(impl serde::Serialize + Sync),
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        self.send(self.request(Method::PUT, url).json(body)).await
    }

    /// PATCH with an optional JSON body. State toggles send none.
    pub(crate) async fn patch<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&(impl serde::Serialize + Sync)>,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        let mut builder = self.request(Method::PATCH, url);
        if let Some(body) = body {
            builder = builder.json(body);
        }
        self.send(builder).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        let _: serde_json::Value = self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }

    fn map_transport(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            Error::Transport(e)
        }
    }

    /// Map the status, then decode the body with envelope unwrapping.
    async fn parse_response<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if status == StatusCode::UNAUTHORIZED {
            warn!("token rejected, clearing session");
            self.clear_token();
            return Err(Error::SessionExpired);
        }

        let body = resp.text().await.map_err(|e| self.map_transport(e))?;

        if status == StatusCode::CONFLICT {
            return Err(Error::Conflict {
                message: error_message(&body),
            });
        }

        if status == StatusCode::FORBIDDEN {
            return Err(Error::Api {
                status: status.as_u16(),
                message: "insufficient permissions (HTTP 403)".into(),
            });
        }

        if !status.is_success() {
            return Err(Error::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        trace!(bytes = body.len(), "response body received");
        decode_payload(&body)
    }
}

// ── Body decoding ────────────────────────────────────────────────────

/// Decode a success body, unwrapping `{ "data": ... }` when present.
///
/// An empty body decodes as JSON `null` so callers asking for
/// `serde_json::Value` or `Option<T>` still succeed.
pub(crate) fn decode_payload<T: DeserializeOwned>(body: &str) -> Result<T, Error> {
    let value: serde_json::Value = if body.trim().is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_str(body).map_err(|e| deserialization_error(&e, body))?
    };

    let payload = match value {
        serde_json::Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(serde_json::Value::Null)
        }
        other => other,
    };

    serde_json::from_value(payload).map_err(|e| deserialization_error(&e, body))
}

fn deserialization_error(e: &serde_json::Error, body: &str) -> Error {
    Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(body)),
        body: body.to_owned(),
    }
}

/// The server's error message, or a preview of the raw body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message.or(b.error))
        .unwrap_or_else(|| preview(body))
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwraps_data_envelope() {
        let v: Vec<u32> = decode_payload(r#"{"success":true,"data":[1,2,3]}"#).unwrap();
        assert_eq!(v, vec![1, 2, 3]);
    }

    #[test]
    fn passes_bare_payloads_through() {
        let v: serde_json::Value = decode_payload(r#"{"count":4}"#).unwrap();
        assert_eq!(v, json!({ "count": 4 }));
    }

    #[test]
    fn empty_body_is_null() {
        let v: serde_json::Value = decode_payload("").unwrap();
        assert!(v.is_null());
    }

    #[test]
    fn bad_json_keeps_body() {
        let err = decode_payload::<serde_json::Value>("<html>").unwrap_err();
        match err {
            Error::Deserialization { body, .. } => assert_eq!(body, "<html>"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn error_message_prefers_server_message() {
        assert_eq!(error_message(r#"{"message":"Domain exists"}"#), "Domain exists");
        assert_eq!(error_message(r#"{"error":"bad row"}"#), "bad row");
        assert_eq!(error_message("plain text"), "plain text");
    }

    #[test]
    fn url_keeps_base_path_prefix() {
        let client = ApiClient::with_client(
            reqwest::Client::new(),
            Url::parse("https://api.example.com/api/").unwrap(),
        );
        assert_eq!(
            client.url("/domains/5/sold").unwrap().as_str(),
            "https://api.example.com/api/domains/5/sold"
        );
    }
}
