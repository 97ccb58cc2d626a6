//! Dispatcher for email notifications.

use std::mem;

use async_trait::async_trait;
use serde::Deserialize;

use super::response::EmailResponse;
use super::transport::{MailTransport, SmtpMailTransport};
use crate::config::EmailSettings;
use crate::dispatch::PushDispatcher;
use crate::error::AppResult;

/// Content carried in a serialized email payload.
#[derive(Debug, Default, Deserialize)]
struct EmailContent {
    #[serde(default)]
    subject: String,
    #[serde(default)]
    body: String,
}

/// Sends one notification at a time as an email.
///
/// The endpoint is the recipient address; the source address is a
/// credential and persists across sends.
pub struct EmailDispatcher<T: MailTransport = SmtpMailTransport> {
    endpoint: String,
    payload: String,
    source: String,
    transport: T,
    setup: bool,
}

impl EmailDispatcher<SmtpMailTransport> {
    /// Creates a dispatcher wired to the configured SMTP relay.
    pub fn from_settings(settings: &EmailSettings) -> Self {
        let mut dispatcher = Self::with_transport(SmtpMailTransport::from_settings(settings));
        dispatcher.set_source(&settings.source);
        dispatcher
    }
}

impl<T: MailTransport> EmailDispatcher<T> {
    /// Creates a dispatcher over an explicit transport.
    pub fn with_transport(transport: T) -> Self {
        Self {
            endpoint: String::new(),
            payload: String::new(),
            source: String::new(),
            transport,
            setup: false,
        }
    }

    /// Sets the sender address used for outgoing notifications.
    pub fn set_source(&mut self, source: &str) -> &mut Self {
        self.source = source.to_string();
        self
    }
}

#[async_trait]
impl<T: MailTransport> PushDispatcher for EmailDispatcher<T> {
    type Response = EmailResponse;

    fn set_endpoint(&mut self, endpoint: &str) -> &mut Self {
        self.endpoint = endpoint.to_string();
        self
    }

    fn set_payload(&mut self, payload: &str) -> &mut Self {
        self.payload = payload.to_string();
        self
    }

    async fn push(&mut self) -> AppResult<EmailResponse> {
        let endpoint = mem::take(&mut self.endpoint);
        let payload = mem::take(&mut self.payload);

        if !self.setup {
            self.transport.connect().await?;
            self.setup = true;
        }

        // The payload travels as the JSON the builder produced; fields the
        // builder never set arrive as empty strings.
        let content: EmailContent = serde_json::from_str(&payload).unwrap_or_default();

        let delivered = self
            .transport
            .send(&self.source, &endpoint, &content.subject, &content.body)
            .await?;

        Ok(EmailResponse::new(delivered, &endpoint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{PushResponse, PushStatus};

    #[derive(Default)]
    struct RecordingMailer {
        connect_calls: usize,
        sends: Vec<(String, String, String, String)>,
        delivered: bool,
    }

    #[async_trait]
    impl MailTransport for RecordingMailer {
        async fn connect(&mut self) -> AppResult<()> {
            self.connect_calls += 1;
            Ok(())
        }

        async fn send(
            &mut self,
            from: &str,
            to: &str,
            subject: &str,
            body: &str,
        ) -> AppResult<bool> {
            self.sends.push((
                from.to_string(),
                to.to_string(),
                subject.to_string(),
                body.to_string(),
            ));
            Ok(self.delivered)
        }
    }

    #[tokio::test]
    async fn test_payload_json_is_decoded_for_the_mailer() {
        let mut dispatcher = EmailDispatcher::with_transport(RecordingMailer {
            delivered: true,
            ..RecordingMailer::default()
        });
        dispatcher
            .set_source("noreply@example.com")
            .set_endpoint("user@example.com")
            .set_payload(r#"{"subject":"Welcome","body":"Hello"}"#);

        let response = dispatcher.push().await.unwrap();

        assert_eq!(response.status(), PushStatus::Success);
        assert_eq!(
            dispatcher.transport.sends,
            vec![(
                "noreply@example.com".to_string(),
                "user@example.com".to_string(),
                "Welcome".to_string(),
                "Hello".to_string(),
            )]
        );
    }

    #[tokio::test]
    async fn test_rejected_send_maps_to_error_status() {
        let mut dispatcher = EmailDispatcher::with_transport(RecordingMailer::default());
        dispatcher
            .set_endpoint("user@example.com")
            .set_payload(r#"{"subject":"s","body":"b"}"#);

        let response = dispatcher.push().await.unwrap();

        assert_eq!(response.status(), PushStatus::Error);
    }

    #[tokio::test]
    async fn test_push_resets_endpoint_and_payload() {
        let mut dispatcher = EmailDispatcher::with_transport(RecordingMailer {
            delivered: true,
            ..RecordingMailer::default()
        });
        dispatcher
            .set_endpoint("user@example.com")
            .set_payload(r#"{"body":"b"}"#);

        dispatcher.push().await.unwrap();

        assert_eq!(dispatcher.endpoint, "");
        assert_eq!(dispatcher.payload, "");
    }

    #[tokio::test]
    async fn test_source_persists_across_sends() {
        let mut dispatcher = EmailDispatcher::with_transport(RecordingMailer {
            delivered: true,
            ..RecordingMailer::default()
        });
        dispatcher.set_source("noreply@example.com");

        dispatcher.set_endpoint("a@example.com").set_payload("{}");
        dispatcher.push().await.unwrap();
        dispatcher.set_endpoint("b@example.com").set_payload("{}");
        dispatcher.push().await.unwrap();

        assert_eq!(dispatcher.transport.connect_calls, 1);
        assert_eq!(dispatcher.transport.sends[0].0, "noreply@example.com");
        assert_eq!(dispatcher.transport.sends[1].0, "noreply@example.com");
        assert_eq!(dispatcher.transport.sends[1].1, "b@example.com");
    }

    #[tokio::test]
    async fn test_unparseable_payload_sends_empty_content() {
        let mut dispatcher = EmailDispatcher::with_transport(RecordingMailer {
            delivered: true,
            ..RecordingMailer::default()
        });
        dispatcher
            .set_endpoint("user@example.com")
            .set_payload("not json");

        dispatcher.push().await.unwrap();

        assert_eq!(dispatcher.transport.sends[0].2, "");
        assert_eq!(dispatcher.transport.sends[0].3, "");
    }
}
