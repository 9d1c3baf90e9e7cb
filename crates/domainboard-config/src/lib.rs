//! Profile configuration for the domainboard CLI.
//!
//! TOML profiles merged with `DOMAINBOARD_` env vars, bearer tokens kept
//! in the OS keyring, and translation to `domainboard_core::ControllerConfig`.
//! The CLI layers its flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use domainboard_core::{AuthCredentials, ControllerConfig, TlsVerification};

/// Keyring service name; entries are `<profile>/token`.
pub const KEYRING_SERVICE: &str = "domainboard";

/// Env var holding a password for non-interactive login.
pub const PASSWORD_ENV: &str = "DOMAINBOARD_PASSWORD";

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "DOMAINBOARD_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{profile}' not found")]
    UnknownProfile { profile: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named API profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// The profile to use: an explicit name, else `default_profile`,
    /// else `"default"`.
    pub fn active_profile_name(&self, explicit: Option<&str>) -> String {
        explicit
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                profile: name.into(),
            })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Rows per page for `domains list` and `tickets list`.
    #[serde(default = "default_page_size")]
    pub page_size: usize,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            page_size: default_page_size(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_page_size() -> usize {
    10
}
fn default_timeout() -> u64 {
    30
}

/// A named API profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Profile {
    /// API root, e.g. "https://api.example.com/api".
    pub api_url: String,

    /// Push endpoint; derived from `api_url` when absent.
    pub websocket_url: Option<String>,

    /// Username for password login.
    pub username: Option<String>,

    /// Environment variable name containing a bearer token.
    pub token_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `DOMAINBOARD_CONFIG`, else the
/// platform config dir (XDG on Linux).
pub fn config_path() -> PathBuf {
    if let Ok(explicit) = std::env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(explicit);
    }
    ProjectDirs::from("com", "domainboard", "domainboard").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("domainboard");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults.
///
/// Env keys nest with a double underscore:
/// `DOMAINBOARD_DEFAULTS__PAGE_SIZE=25` sets `defaults.page_size`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("DOMAINBOARD_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Keyring token storage ───────────────────────────────────────────

fn token_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/token"),
    )?)
}

/// Persist a bearer token for `profile_name`.
pub fn store_token(profile_name: &str, token: &SecretString) -> Result<(), ConfigError> {
    token_entry(profile_name)?.set_password(token.expose_secret())?;
    Ok(())
}

/// The stored token, if any. Keyring failures read as "no token".
pub fn load_token(profile_name: &str) -> Option<SecretString> {
    token_entry(profile_name)
        .ok()?
        .get_password()
        .ok()
        .map(SecretString::from)
}

/// Remove the stored token. Removing a missing token is not an error.
pub fn clear_token(profile_name: &str) -> Result<(), ConfigError> {
    match token_entry(profile_name)?.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve a bearer token: profile `token_env`, then keyring.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    load_token(profile_name)
}

/// Resolve `AuthCredentials`: a token when one is available, otherwise
/// the profile's username with `DOMAINBOARD_PASSWORD`.
pub fn resolve_auth(profile: &Profile, profile_name: &str) -> Result<AuthCredentials, ConfigError> {
    if let Some(token) = resolve_token(profile, profile_name) {
        return Ok(AuthCredentials::Token(token));
    }

    if let (Some(username), Ok(password)) = (&profile.username, std::env::var(PASSWORD_ENV)) {
        return Ok(AuthCredentials::Credentials {
            username: username.clone(),
            password: SecretString::from(password),
        });
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

fn parse_url(field: &str, raw: &str) -> Result<url::Url, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })
}

/// TLS policy for a profile; the global `insecure` default applies when
/// the profile doesn't override it.
pub fn profile_tls(profile: &Profile, defaults: &Defaults) -> TlsVerification {
    if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    }
}

/// Build a `ControllerConfig` from a profile with the given credentials.
///
/// The push stream starts disabled; `tickets watch` turns it on.
pub fn profile_to_controller_config(
    profile: &Profile,
    defaults: &Defaults,
    auth: AuthCredentials,
) -> Result<ControllerConfig, ConfigError> {
    let url = parse_url("api_url", &profile.api_url)?;
    let websocket_url = profile
        .websocket_url
        .as_deref()
        .map(|raw| parse_url("websocket_url", raw))
        .transpose()?;

    Ok(ControllerConfig {
        url,
        auth,
        tls: profile_tls(profile, defaults),
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        websocket_enabled: false,
        websocket_url,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.defaults.page_size, 10);
        assert_eq!(cfg.defaults.timeout, 30);
        assert_eq!(cfg.active_profile_name(None), "default");
    }

    #[test]
    fn file_values_fill_profiles_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            &dir,
            r#"
default_profile = "prod"

[defaults]
page_size = 25

[profiles.prod]
api_url = "https://api.example.com/api"
username = "admin"
insecure = true
"#,
        );

        let cfg = load_config_from(&path).unwrap();
        assert_eq!(cfg.defaults.page_size, 25);
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.active_profile_name(None), "prod");
        assert_eq!(cfg.active_profile_name(Some("other")), "other");

        let prod = cfg.profile("prod").unwrap();
        assert_eq!(prod.username.as_deref(), Some("admin"));
        assert!(matches!(
            cfg.profile("missing"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                api_url: "http://localhost:3000/api".into(),
                websocket_url: Some("ws://localhost:3000".into()),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        assert_eq!(load_config_from(&path).unwrap(), cfg);
    }

    #[test]
    fn profile_builds_controller_config() {
        let profile = Profile {
            api_url: "https://api.example.com/api".into(),
            ca_cert: Some(PathBuf::from("/etc/ca.pem")),
            timeout: Some(5),
            ..Profile::default()
        };
        let auth = AuthCredentials::Token("t".to_string().into());

        let cfg = profile_to_controller_config(&profile, &Defaults::default(), auth).unwrap();
        assert_eq!(cfg.url.as_str(), "https://api.example.com/api");
        assert_eq!(cfg.timeout, Duration::from_secs(5));
        assert_eq!(cfg.tls, TlsVerification::CustomCa(PathBuf::from("/etc/ca.pem")));
        assert!(!cfg.websocket_enabled);
        assert!(cfg.websocket_url.is_none());
    }

    #[test]
    fn insecure_default_applies_without_override() {
        let defaults = Defaults {
            insecure: true,
            ..Defaults::default()
        };
        let profile = Profile::default();
        assert_eq!(
            profile_tls(&profile, &defaults),
            TlsVerification::DangerAcceptInvalid
        );

        let strict = Profile {
            insecure: Some(false),
            ..Profile::default()
        };
        assert_eq!(profile_tls(&strict, &defaults), TlsVerification::SystemDefaults);
    }

    #[test]
    fn bad_url_is_validation_error() {
        let profile = Profile {
            api_url: "not a url".into(),
            ..Profile::default()
        };
        let auth = AuthCredentials::Token("t".to_string().into());
        let err = profile_to_controller_config(&profile, &Defaults::default(), auth).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "api_url"));
    }
}
