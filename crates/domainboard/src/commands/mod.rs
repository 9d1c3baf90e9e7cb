//! Command handlers, one module per top-level subcommand.

pub mod auth;
pub mod config_cmd;
pub mod domains;
pub mod notify;
pub mod search;
pub mod tickets;
pub mod util;

use crate::cli::{Command, GlobalOpts};
use crate::config::Config;
use crate::error::CliError;

/// Route a parsed command to its handler.
///
/// `config` and `completions` are handled before a profile is resolved and
/// never reach this function.
pub async fn dispatch(cmd: Command, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(args, global, cfg).await,
        Command::Logout => auth::logout(global, cfg),
        Command::Domains(args) => domains::handle(args, global, cfg).await,
        Command::Search(args) => search::handle(args, global, cfg).await,
        Command::Tickets(args) => tickets::handle(args, global, cfg).await,
        Command::Notify { message } => notify::handle(message, global, cfg).await,
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "configuration commands run without a session".into(),
        )),
    }
}
