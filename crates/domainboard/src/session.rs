//! A connected API session for one CLI invocation.
//!
//! Resolves profile and credentials, connects the controller, persists a
//! token obtained by password login, and clears it again when the API
//! reports the session expired.

use tracing::{debug, warn};

use domainboard_core::{AuthCredentials, Controller};

use crate::cli::GlobalOpts;
use crate::config::{self, Config};
use crate::error::CliError;

pub struct Session {
    controller: Controller,
    profile: String,
}

impl Session {
    /// Connect using the active profile. `live` enables the push stream.
    pub async fn open(global: &GlobalOpts, cfg: &Config, live: bool) -> Result<Self, CliError> {
        let (profile_name, profile) = config::resolve_profile(global, cfg)?;
        let auth = config::resolve_auth(global, &profile, &profile_name)?;
        let persist_token = matches!(auth, AuthCredentials::Credentials { .. });

        let mut controller_config = config::controller_config(global, cfg, &profile, auth)?;
        controller_config.websocket_enabled = live;
        debug!(profile = %profile_name, url = %controller_config.url, "opening session");

        let session = Self {
            controller: Controller::new(controller_config),
            profile: profile_name,
        };

        if let Err(e) = session.controller.connect().await {
            return Err(session.expire(e.into()));
        }

        if persist_token {
            if let Some(token) = session.controller.token().await {
                if let Err(e) = config::store_token(&session.profile, &token) {
                    warn!(error = %e, "could not store token in keyring");
                }
            }
        }

        Ok(session)
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    /// Disconnect and pass `result` through, clearing the stored token if
    /// it was rejected.
    pub async fn finish<T>(self, result: Result<T, CliError>) -> Result<T, CliError> {
        self.controller.disconnect().await;
        result.map_err(|e| self.expire(e))
    }

    fn expire(&self, err: CliError) -> CliError {
        match err {
            CliError::SessionExpired { .. } => {
                if let Err(e) = config::clear_token(&self.profile) {
                    warn!(error = %e, "could not clear stored token");
                }
                CliError::SessionExpired {
                    profile: self.profile.clone(),
                }
            }
            other => other,
        }
    }
}
