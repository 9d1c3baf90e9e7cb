//! `login` and `logout`.

use dialoguer::Input;
use secrecy::SecretString;

use domainboard_core::{AuthCredentials, Controller};

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config::{self, Config};
use crate::error::CliError;

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Exchange username and password for a token and keep it in the keyring.
pub async fn login(args: LoginArgs, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    let (profile_name, profile) = config::resolve_profile(global, cfg)?;

    let username = match args.username.or_else(|| profile.username.clone()) {
        Some(u) => u,
        None => Input::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(prompt_err)?,
    };

    let password = match std::env::var(domainboard_config::PASSWORD_ENV) {
        Ok(p) if !p.is_empty() => SecretString::from(p),
        _ => config::prompt_password(&username)?,
    };

    let auth = AuthCredentials::Credentials {
        username: username.clone(),
        password,
    };
    let controller_config = config::controller_config(global, cfg, &profile, auth)?;
    let token = Controller::authenticate(&controller_config).await?;

    config::store_token(&profile_name, &token)?;
    if !global.quiet {
        eprintln!("✓ Logged in as {username} (profile '{profile_name}')");
    }
    Ok(())
}

pub fn logout(global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    let profile_name = config::active_profile_name(global, cfg);
    config::clear_token(&profile_name)?;
    if !global.quiet {
        eprintln!("✓ Stored token cleared for profile '{profile_name}'");
    }
    Ok(())
}
