//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use domainboard_config::ConfigError;
use domainboard_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 5;
    pub const CONNECTION: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the API at {url}")]
    #[diagnostic(
        code(domainboard::connection_failed),
        help(
            "Check that the API is running and reachable.\n\
             URL: {url}\n\
             Use --insecure (-k) for self-signed certificates."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(domainboard::timeout),
        help("Increase timeout with --timeout or check API responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(domainboard::auth_failed),
        help("Check the username and password, then run: domainboard login")
    )]
    AuthFailed { message: String },

    #[error("Session expired for profile '{profile}'")]
    #[diagnostic(
        code(domainboard::session_expired),
        help("The stored token was cleared. Run: domainboard login")
    )]
    SessionExpired { profile: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(domainboard::no_credentials),
        help(
            "Run: domainboard login\n\
             Or set DOMAINBOARD_TOKEN, or DOMAINBOARD_PASSWORD with a profile username."
        )
    )]
    NoCredentials { profile: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(domainboard::not_found),
        help("Run: domainboard {list_command} to see available entries")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(code(domainboard::conflict))]
    Conflict { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(domainboard::incomplete_panel),
        help("Fill in panel link, username and password on the source domain first.")
    )]
    IncompletePanel { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error{}: {message}", status_suffix(*.status))]
    #[diagnostic(code(domainboard::api_error))]
    ApiError {
        status: Option<u16>,
        message: String,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(domainboard::validation))]
    Validation { field: String, reason: String },

    #[error("CSV has {count} invalid row(s)")]
    #[diagnostic(
        code(domainboard::import_invalid),
        help("Fix the rows listed above; `domainboard domains template` shows the layout.")
    )]
    InvalidImport { count: usize },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(domainboard::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: domainboard config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No API URL configured")]
    #[diagnostic(
        code(domainboard::no_config),
        help(
            "Create a profile with: domainboard config init\n\
             Or pass --api-url / set DOMAINBOARD_API_URL.\n\
             Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(domainboard::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(domainboard::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render output: {0}")]
    #[diagnostic(code(domainboard::render))]
    Render(String),

    #[error("{0}")]
    #[diagnostic(code(domainboard::internal))]
    Internal(String),
}

fn status_suffix(status: Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::Timeout { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::SessionExpired { .. } | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::InvalidImport { .. }
            | Self::IncompletePanel { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::NoConfig { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError ───────────────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(Box::new(other)),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },

            CoreError::Disconnected => CliError::ConnectionFailed {
                url: "(disconnected)".into(),
                source: "API session is not connected".into(),
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed { message },

            CoreError::SessionExpired => CliError::SessionExpired {
                profile: "current".into(),
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: format!("{}s list", entity_type.to_lowercase()),
                resource_type: entity_type.into(),
                identifier,
            },

            CoreError::Conflict { message } => CliError::Conflict { message },

            err @ CoreError::IncompletePanel { .. } => CliError::IncompletePanel {
                message: err.to_string(),
            },

            err @ CoreError::InvalidTransition { .. } => CliError::Validation {
                field: "status".into(),
                reason: err.to_string(),
            },

            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Api { message, status } => CliError::ApiError { status, message },

            CoreError::Io { path, message } => {
                CliError::Io(std::io::Error::other(format!("{path}: {message}")))
            }

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}
