// ── Runtime connection configuration ──
//
// These types describe *how* to reach the listings API. They carry
// credential data and connection tuning, but never touch disk.
// The CLI constructs a `ControllerConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// How to authenticate with the API.
#[derive(Debug, Clone)]
pub enum AuthCredentials {
    /// A bearer token from an earlier login (keyring, env, or flag).
    Token(SecretString),
    /// Username and password, exchanged for a token on connect.
    Credentials {
        username: String,
        password: SecretString,
    },
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed certs).
    DangerAcceptInvalid,
}

/// Configuration for one API endpoint.
///
/// Built by the CLI, passed to `Controller` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// API root, e.g. `https://api.example.com/api`.
    pub url: Url,
    pub auth: AuthCredentials,
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// Listen for pushed ticket events.
    pub websocket_enabled: bool,
    /// Push endpoint; derived from `url` when absent.
    pub websocket_url: Option<Url>,
}

impl ControllerConfig {
    pub fn new(url: Url, auth: AuthCredentials) -> Self {
        Self {
            url,
            auth,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            websocket_enabled: false,
            websocket_url: None,
        }
    }
}
