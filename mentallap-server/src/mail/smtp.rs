//! SMTP delivery through lettre (STARTTLS relay, pooled async transport)

use async_trait::async_trait;
use lettre::address::{Address, AddressError};
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::{EmailMessage, MailError, Mailer};

/// Default submission port for STARTTLS
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// SMTP connection settings
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    /// Account used to authenticate and as the sender address
    pub username: String,
    pub password: String,
}

/// Mailer backed by an SMTP relay
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: String,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .build();

        Ok(Self {
            transport,
            sender: settings.username.clone(),
        })
    }

    fn build(&self, message: &EmailMessage) -> Result<Message, MailError> {
        let from = mailbox(Some(&message.from_name), &self.sender)?;
        let to = mailbox(None, &message.to)?;

        let mut builder = Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.clone());
        if let Some(reply_to) = &message.reply_to {
            builder = builder.reply_to(mailbox(None, reply_to)?);
        }

        builder
            .multipart(MultiPart::alternative_plain_html(
                message.text.clone(),
                message.html.clone(),
            ))
            .map_err(|e| MailError::Build(e.to_string()))
    }
}

fn mailbox(name: Option<&str>, address: &str) -> Result<Mailbox, MailError> {
    let parsed: Address = address.parse().map_err(|e: AddressError| MailError::Address {
        address: address.to_owned(),
        reason: e.to_string(),
    })?;
    Ok(Mailbox::new(name.map(str::to_owned), parsed))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let email = self.build(message)?;
        self.transport
            .send(email)
            .await
            .map_err(|e| MailError::Transport(e.to_string()))?;
        tracing::info!(to = %message.to, subject = %message.subject, "email sent");
        Ok(())
    }

    fn transport(&self) -> &'static str {
        "smtp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SmtpSettings {
        SmtpSettings {
            host: "smtp.gmail.com".into(),
            port: DEFAULT_SMTP_PORT,
            username: "hello@thementallap.com".into(),
            password: "app-password".into(),
        }
    }

    fn message(to: &str) -> EmailMessage {
        EmailMessage {
            from_name: "The Mental Lap".into(),
            to: to.into(),
            reply_to: Some("athlete@example.com".into()),
            subject: "Thank you for contacting The Mental Lap".into(),
            text: "Hi".into(),
            html: "<p>Hi</p>".into(),
        }
    }

    #[tokio::test]
    async fn builds_multipart_message() {
        let mailer = SmtpMailer::new(&settings()).unwrap();
        let built = mailer.build(&message("support@thementallap.com")).unwrap();
        let raw = String::from_utf8(built.formatted()).unwrap();

        assert!(raw.contains("support@thementallap.com"));
        assert!(raw.contains("athlete@example.com"));
        assert!(raw.contains("multipart/alternative"));
    }

    #[tokio::test]
    async fn rejects_bad_recipient() {
        let mailer = SmtpMailer::new(&settings()).unwrap();
        assert!(matches!(
            mailer.build(&message("not an address")).unwrap_err(),
            MailError::Address { .. }
        ));
    }
}
