// Bearer-token login
//
// `POST /auth/login` trades a username and password for a token. The token
// is stored on the client and sent on every later request.

use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::debug;

use crate::client::{ApiClient, decode_payload};
use crate::error::Error;

#[derive(serde::Deserialize)]
struct LoginResponse {
    token: String,
}

impl ApiClient {
    /// Authenticate with username/password and keep the issued token.
    ///
    /// Returns the token so callers can persist it (e.g. in the keyring).
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<SecretString, Error> {
        let url = self.url("auth/login")?;
        debug!(username, "logging in");

        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let resp = self
            .request(Method::POST, url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        let text = resp.text().await.map_err(Error::Transport)?;

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::BAD_REQUEST {
            return Err(Error::Authentication {
                message: login_failure_message(&text),
            });
        }
        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status})"),
            });
        }

        let LoginResponse { token } = decode_payload(&text)?;
        let token = SecretString::from(token);
        self.set_token(token.clone());

        debug!("login successful");
        Ok(token)
    }

    /// Forget the token. The API has no server-side logout.
    pub fn logout(&self) {
        debug!("logging out");
        self.clear_token();
    }
}

fn login_failure_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| "invalid credentials".into())
}
