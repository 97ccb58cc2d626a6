//! Dispatcher for Apple push notifications.

use std::mem;

use async_trait::async_trait;

use super::response::ApnsResponse;
use super::transport::{ApnsCredentials, ApnsTransport, TlsApnsTransport};
use crate::config::ApnsSettings;
use crate::dispatch::PushDispatcher;
use crate::error::AppResult;

/// Sends one notification at a time through the Apple binary gateway.
///
/// Endpoint and payload are per-notification state, cleared after every
/// push; the certificate credentials and the established gateway session
/// persist for the lifetime of the dispatcher.
///
/// # Example
/// ```ignore
/// let mut dispatcher = ApnsDispatcher::from_settings(&settings.apns);
/// dispatcher
///     .set_endpoint(&device_token)
///     .set_payload(&payload.serialize());
/// let response = dispatcher.push().await?;
/// ```
pub struct ApnsDispatcher<T: ApnsTransport = TlsApnsTransport> {
    endpoint: String,
    payload: String,
    credentials: ApnsCredentials,
    transport: T,
    setup: bool,
}

impl ApnsDispatcher<TlsApnsTransport> {
    /// Creates a dispatcher wired to the configured gateway.
    pub fn from_settings(settings: &ApnsSettings) -> Self {
        let mut dispatcher = Self::with_transport(TlsApnsTransport::from_settings(settings));
        dispatcher
            .set_certificate(&settings.certificate)
            .set_passphrase(&settings.passphrase);
        dispatcher
    }
}

impl<T: ApnsTransport> ApnsDispatcher<T> {
    /// Creates a dispatcher over an explicit transport.
    pub fn with_transport(transport: T) -> Self {
        Self {
            endpoint: String::new(),
            payload: String::new(),
            credentials: ApnsCredentials::default(),
            transport,
            setup: false,
        }
    }

    /// Sets the path of the PKCS#12 archive holding the push certificate.
    pub fn set_certificate(&mut self, certificate: &str) -> &mut Self {
        self.credentials.certificate = certificate.to_string();
        self
    }

    /// Sets the passphrase protecting the certificate archive.
    pub fn set_passphrase(&mut self, passphrase: &str) -> &mut Self {
        self.credentials.passphrase = passphrase.to_string();
        self
    }
}

#[async_trait]
impl<T: ApnsTransport> PushDispatcher for ApnsDispatcher<T> {
    type Response = ApnsResponse;

    fn set_endpoint(&mut self, endpoint: &str) -> &mut Self {
        self.endpoint = endpoint.to_string();
        self
    }

    fn set_payload(&mut self, payload: &str) -> &mut Self {
        self.payload = payload.to_string();
        self
    }

    async fn push(&mut self) -> AppResult<ApnsResponse> {
        // Taking the per-notification state up front keeps it cleared on
        // every exit path, error paths included.
        let endpoint = mem::take(&mut self.endpoint);
        let payload = mem::take(&mut self.payload);

        if !self.setup {
            self.transport.connect(&self.credentials).await?;
            self.setup = true;
        }

        let outcome = self.transport.send(&endpoint, payload.as_bytes()).await?;

        Ok(ApnsResponse::new(outcome, &endpoint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::apns::status::ApnsOutcome;
    use crate::dispatch::{PushResponse, PushStatus};
    use crate::error::AppError;

    /// Transport fake that records calls and replays scripted outcomes.
    #[derive(Default)]
    struct RecordingTransport {
        connect_calls: usize,
        sends: Vec<(String, String)>,
        outcomes: Vec<AppResult<ApnsOutcome>>,
    }

    impl RecordingTransport {
        fn scripted(outcomes: Vec<AppResult<ApnsOutcome>>) -> Self {
            Self {
                outcomes,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl ApnsTransport for RecordingTransport {
        async fn connect(&mut self, _credentials: &ApnsCredentials) -> AppResult<()> {
            self.connect_calls += 1;
            Ok(())
        }

        async fn send(&mut self, device_token: &str, payload: &[u8]) -> AppResult<ApnsOutcome> {
            self.sends.push((
                device_token.to_string(),
                String::from_utf8_lossy(payload).into_owned(),
            ));
            self.outcomes.remove(0)
        }
    }

    fn dispatcher(
        outcomes: Vec<AppResult<ApnsOutcome>>,
    ) -> ApnsDispatcher<RecordingTransport> {
        ApnsDispatcher::with_transport(RecordingTransport::scripted(outcomes))
    }

    #[tokio::test]
    async fn test_push_returns_normalized_response() {
        let mut dispatcher = dispatcher(vec![Ok(ApnsOutcome::accepted())]);
        dispatcher
            .set_endpoint("abcdef012345")
            .set_payload(r#"{"alert":"hi"}"#);

        let response = dispatcher.push().await.unwrap();

        assert_eq!(response.status(), PushStatus::Success);
        assert_eq!(
            dispatcher.transport.sends,
            vec![("abcdef012345".to_string(), r#"{"alert":"hi"}"#.to_string())]
        );
    }

    #[tokio::test]
    async fn test_push_resets_endpoint_and_payload() {
        let mut dispatcher = dispatcher(vec![Ok(ApnsOutcome::accepted())]);
        dispatcher.set_endpoint("abcdef").set_payload("{}");

        dispatcher.push().await.unwrap();

        assert_eq!(dispatcher.endpoint, "");
        assert_eq!(dispatcher.payload, "");
        assert!(dispatcher.setup);
    }

    #[tokio::test]
    async fn test_push_resets_state_on_transport_error() {
        let mut dispatcher = dispatcher(vec![Err(AppError::Transport {
            provider: "apns",
            operation: "send",
            source: anyhow::anyhow!("connection reset"),
        })]);
        dispatcher.set_endpoint("abcdef").set_payload("{}");

        let result = dispatcher.push().await;

        assert!(result.is_err());
        assert_eq!(dispatcher.endpoint, "");
        assert_eq!(dispatcher.payload, "");
    }

    #[tokio::test]
    async fn test_consecutive_pushes_do_not_leak_state() {
        let mut dispatcher = dispatcher(vec![
            Ok(ApnsOutcome::accepted()),
            Ok(ApnsOutcome::accepted()),
        ]);

        dispatcher.set_endpoint("first").set_payload(r#"{"alert":"one"}"#);
        dispatcher.push().await.unwrap();

        dispatcher.set_endpoint("second").set_payload(r#"{"alert":"two"}"#);
        dispatcher.push().await.unwrap();

        assert_eq!(dispatcher.transport.sends[1].0, "second");
        assert_eq!(dispatcher.transport.sends[1].1, r#"{"alert":"two"}"#);
    }

    #[tokio::test]
    async fn test_transport_setup_runs_once() {
        let mut dispatcher = dispatcher(vec![
            Ok(ApnsOutcome::accepted()),
            Ok(ApnsOutcome::accepted()),
        ]);

        dispatcher.set_endpoint("a").set_payload("{}");
        dispatcher.push().await.unwrap();
        dispatcher.set_endpoint("b").set_payload("{}");
        dispatcher.push().await.unwrap();

        assert_eq!(dispatcher.transport.connect_calls, 1);
    }

    #[tokio::test]
    async fn test_failed_setup_is_retried_on_next_push() {
        struct FailingConnect {
            connect_calls: usize,
        }

        #[async_trait]
        impl ApnsTransport for FailingConnect {
            async fn connect(&mut self, _credentials: &ApnsCredentials) -> AppResult<()> {
                self.connect_calls += 1;
                if self.connect_calls == 1 {
                    return Err(AppError::Transport {
                        provider: "apns",
                        operation: "connect",
                        source: anyhow::anyhow!("gateway unreachable"),
                    });
                }
                Ok(())
            }

            async fn send(&mut self, _token: &str, _payload: &[u8]) -> AppResult<ApnsOutcome> {
                Ok(ApnsOutcome::accepted())
            }
        }

        let mut dispatcher =
            ApnsDispatcher::with_transport(FailingConnect { connect_calls: 0 });

        dispatcher.set_endpoint("abcdef").set_payload("{}");
        assert!(dispatcher.push().await.is_err());
        assert!(!dispatcher.setup);

        dispatcher.set_endpoint("abcdef").set_payload("{}");
        assert!(dispatcher.push().await.is_ok());
        assert!(dispatcher.setup);
        assert_eq!(dispatcher.transport.connect_calls, 2);
    }

    #[test]
    fn test_credential_setters_chain() {
        let mut dispatcher = dispatcher(vec![]);
        dispatcher
            .set_certificate("/etc/push/cert.p12")
            .set_passphrase("secret");

        assert_eq!(dispatcher.credentials.certificate, "/etc/push/cert.p12");
        assert_eq!(dispatcher.credentials.passphrase, "secret");
    }
}
