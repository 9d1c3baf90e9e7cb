//! CLI configuration: a thin wrapper around `domainboard_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--api-url, --token, etc.).

use std::io::IsTerminal;
use std::time::Duration;

use secrecy::SecretString;

use domainboard_core::{AuthCredentials, ControllerConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use domainboard_config::{
    Config, Profile, clear_token, config_path, load_config_or_default, save_config,
    store_token,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    names.sort();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}

/// The active profile with `--api-url` applied, or a bare profile built
/// from `--api-url` alone when the config has none.
pub fn resolve_profile(global: &GlobalOpts, config: &Config) -> Result<(String, Profile), CliError> {
    let name = active_profile_name(global, config);

    let profile = match (config.profiles.get(&name), &global.api_url) {
        (Some(profile), url) => {
            let mut profile = profile.clone();
            if let Some(url) = url {
                profile.api_url.clone_from(url);
            }
            profile
        }
        (None, Some(url)) => Profile {
            api_url: url.clone(),
            ..Profile::default()
        },
        (None, None) if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name,
                available: available_profiles(config),
            });
        }
        (None, None) => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    Ok((name, profile))
}

/// Resolve credentials: `--token`, then profile `token_env`, then the
/// keyring, then username + password (env var or prompt).
pub fn resolve_auth(
    global: &GlobalOpts,
    profile: &Profile,
    profile_name: &str,
) -> Result<AuthCredentials, CliError> {
    if let Some(ref token) = global.token {
        return Ok(AuthCredentials::Token(SecretString::from(token.clone())));
    }

    match domainboard_config::resolve_auth(profile, profile_name) {
        Ok(auth) => Ok(auth),
        Err(domainboard_config::ConfigError::NoCredentials { .. })
            if profile.username.is_some() && std::io::stdin().is_terminal() =>
        {
            let username = profile.username.clone().unwrap_or_default();
            let password = prompt_password(&username)?;
            Ok(AuthCredentials::Credentials { username, password })
        }
        Err(e) => Err(e.into()),
    }
}

/// Read a password from the terminal without echo.
pub fn prompt_password(username: &str) -> Result<SecretString, CliError> {
    let pass = rpassword::prompt_password(format!("Password for {username}: "))?;
    if pass.is_empty() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "password cannot be empty".into(),
        });
    }
    Ok(SecretString::from(pass))
}

/// Translate a `Profile` + global flags into a `ControllerConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn controller_config(
    global: &GlobalOpts,
    config: &Config,
    profile: &Profile,
    auth: AuthCredentials,
) -> Result<ControllerConfig, CliError> {
    let mut cc = domainboard_config::profile_to_controller_config(profile, &config.defaults, auth)?;
    if global.insecure {
        cc.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        cc.timeout = Duration::from_secs(secs);
    }
    Ok(cc)
}

/// Rows per page: the flag, else the configured default.
pub fn page_size(flag: Option<usize>, config: &Config) -> usize {
    flag.unwrap_or(config.defaults.page_size)
}
