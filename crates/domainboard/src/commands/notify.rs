//! `notify`: push a message to the operators' Telegram chat.

use domainboard_core::{Command as CoreCommand, CommandResult};

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::error::CliError;
use crate::output;
use crate::session::Session;

pub async fn handle(message: String, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    if message.trim().is_empty() {
        return Err(CliError::Validation {
            field: "message".into(),
            reason: "message cannot be empty".into(),
        });
    }

    let session = Session::open(global, cfg, false).await?;
    let result = session
        .controller()
        .execute(CoreCommand::NotifyTelegram { message })
        .await
        .map_err(CliError::from);
    let result = session.finish(result).await?;

    if let CommandResult::Notified(reply) = result {
        if !matches!(global.output, crate::cli::OutputFormat::Table) {
            let out = output::render_single(&global.output, &reply, |_| String::new(), |_| {
                "sent".into()
            })?;
            output::print_output(&out, global.quiet);
            return Ok(());
        }
    }
    if !global.quiet {
        eprintln!("✓ Notification sent");
    }
    Ok(())
}
