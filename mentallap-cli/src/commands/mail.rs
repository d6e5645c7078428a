//! Mail transport check

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use mentallap_server::mail::{send_test_email, Mailer};
use mentallap_server::mailer_for;

use crate::config::load_app_config;

#[derive(Parser, Debug)]
pub struct MailArgs {
    #[command(subcommand)]
    pub command: MailCommands,
}

#[derive(Subcommand, Debug)]
pub enum MailCommands {
    /// Send a test email through the configured transport
    Test {
        /// Recipient (default: the configured support address)
        recipient: Option<String>,
    },
}

pub async fn run_mail(args: MailArgs, config_path: Option<&Path>) -> Result<()> {
    match args.command {
        MailCommands::Test { recipient } => {
            let config = load_app_config(config_path)?;
            let mailer = mailer_for(&config).context("Failed to set up mail transport")?;
            let recipient = recipient.unwrap_or_else(|| config.contact.support_email.clone());

            send_test_email(mailer.as_ref(), &recipient)
                .await
                .with_context(|| format!("Test email to {recipient} failed"))?;
            println!("Test email sent to {recipient} via {}", mailer.transport());
        }
    }
    Ok(())
}
