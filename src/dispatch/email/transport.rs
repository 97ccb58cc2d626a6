//! Transport adapter for email delivery.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::config::EmailSettings;
use crate::error::{AppError, AppResult};

/// SMTP-side collaborator boundary.
///
/// `send` returns the provider's accept/reject verdict as a boolean; only
/// failures of the SMTP session mechanics surface as errors.
#[async_trait]
pub trait MailTransport: Send {
    /// One-time session setup (relay, credentials).
    async fn connect(&mut self) -> AppResult<()>;

    /// Delivers one message.
    async fn send(&mut self, from: &str, to: &str, subject: &str, body: &str)
        -> AppResult<bool>;
}

/// Production transport over lettre's pooled async SMTP client.
pub struct SmtpMailTransport {
    settings: EmailSettings,
    mailer: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpMailTransport {
    pub fn from_settings(settings: &EmailSettings) -> Self {
        Self {
            settings: settings.clone(),
            mailer: None,
        }
    }

    fn build_mailer(&self) -> AppResult<AsyncSmtpTransport<Tokio1Executor>> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.settings.smtp_host)
            .map_err(|e| AppError::Transport {
                provider: "email",
                operation: "session setup",
                source: e.into(),
            })?
            .port(self.settings.smtp_port);

        if !self.settings.username.is_empty() {
            builder = builder.credentials(Credentials::new(
                self.settings.username.clone(),
                self.settings.password.clone(),
            ));
        }

        Ok(builder.build())
    }

    /// Assembles the message, or `None` when the addresses or content are
    /// not acceptable. That is a delivery verdict, not a transport failure.
    fn build_message(from: &str, to: &str, subject: &str, body: &str) -> Option<Message> {
        let from: Mailbox = from.parse().ok()?;
        let to: Mailbox = to.parse().ok()?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .body(body.to_string())
            .ok()
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn connect(&mut self) -> AppResult<()> {
        self.mailer = Some(self.build_mailer()?);

        debug!(host = %self.settings.smtp_host, port = self.settings.smtp_port, "smtp transport ready");

        Ok(())
    }

    async fn send(
        &mut self,
        from: &str,
        to: &str,
        subject: &str,
        body: &str,
    ) -> AppResult<bool> {
        let mailer = self
            .mailer
            .as_ref()
            .ok_or(AppError::SessionNotInitialized { provider: "email" })?;

        let message = match Self::build_message(from, to, subject, body) {
            Some(message) => message,
            None => return Ok(false),
        };

        match mailer.send(message).await {
            Ok(response) => Ok(response.is_positive()),
            // An SMTP rejection is the provider's verdict on this message.
            Err(e) if e.is_permanent() || e.is_transient() => Ok(false),
            Err(e) => Err(AppError::Transport {
                provider: "email",
                operation: "send",
                source: e.into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_message_accepts_valid_addresses() {
        let message = SmtpMailTransport::build_message(
            "sender@example.com",
            "user@example.com",
            "Subject",
            "Body",
        );
        assert!(message.is_some());
    }

    #[test]
    fn test_build_message_rejects_malformed_addresses() {
        assert!(
            SmtpMailTransport::build_message("not-an-address", "user@example.com", "s", "b")
                .is_none()
        );
        assert!(
            SmtpMailTransport::build_message("sender@example.com", "also bad", "s", "b")
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_send_before_connect_is_an_error() {
        let mut transport = SmtpMailTransport::from_settings(&EmailSettings::default());

        let result = transport
            .send("sender@example.com", "user@example.com", "s", "b")
            .await;

        assert!(matches!(
            result,
            Err(AppError::SessionNotInitialized { provider: "email" })
        ));
    }
}
