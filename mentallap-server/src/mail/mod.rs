//! Outbound email
//!
//! Handlers talk to `dyn Mailer`; the server picks SMTP when it is configured
//! and the log-only mailer otherwise.

pub mod smtp;
pub mod templates;

use std::sync::Mutex;

use async_trait::async_trait;

pub use smtp::{SmtpMailer, SmtpSettings};

/// Mail error type
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid address '{address}': {reason}")]
    Address { address: String, reason: String },

    #[error("could not build message: {0}")]
    Build(String),

    #[error("delivery failed: {0}")]
    Transport(String),
}

/// A rendered email ready to hand to a transport
#[derive(Debug, Clone, PartialEq)]
pub struct EmailMessage {
    /// Display name put in front of the sender address
    pub from_name: String,
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub text: String,
    pub html: String,
}

/// Something that can deliver an email
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;

    /// Short transport name for logs and the admin test endpoint.
    fn transport(&self) -> &'static str;
}

/// Development mailer: logs instead of sending.
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "email not sent (SMTP not configured)"
        );
        Ok(())
    }

    fn transport(&self) -> &'static str {
        "log"
    }
}

/// Records messages in memory; optionally fails every send.
#[derive(Debug, Default)]
pub struct MemoryMailer {
    sent: Mutex<Vec<EmailMessage>>,
    fail: bool,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every delivery fails.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Transport("connection refused".into()));
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(message.clone());
        }
        Ok(())
    }

    fn transport(&self) -> &'static str {
        "memory"
    }
}

/// Send the delivery-check message to `recipient`, logging the outcome.
pub async fn send_test_email(mailer: &dyn Mailer, recipient: &str) -> Result<(), MailError> {
    let transport = mailer.transport();
    match mailer.send(&templates::test_email(recipient, transport)).await {
        Ok(()) => {
            tracing::info!(to = %recipient, transport, "test email sent");
            Ok(())
        }
        Err(e) => {
            tracing::error!(to = %recipient, transport, error = %e, "test email failed");
            Err(e)
        }
    }
}
