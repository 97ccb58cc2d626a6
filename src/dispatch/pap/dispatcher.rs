//! Dispatcher for carrier push notifications.

use std::mem;

use async_trait::async_trait;
use uuid::Uuid;

use super::response::PapResponse;
use super::transport::{HttpPapTransport, PapRequest, PapTransport};
use crate::config::PapSettings;
use crate::dispatch::PushDispatcher;
use crate::error::AppResult;

/// Sends one notification at a time through the carrier's PAP gateway.
///
/// Gateway credentials (auth token, password, content-provider ID) and the
/// delivery deadline persist across sends; a fresh push ID is generated for
/// every request.
pub struct PapDispatcher<T: PapTransport = HttpPapTransport> {
    endpoint: String,
    payload: String,
    auth_token: String,
    password: String,
    cid: String,
    deliver_before: String,
    transport: T,
    setup: bool,
}

impl PapDispatcher<HttpPapTransport> {
    /// Creates a dispatcher wired to the configured gateway.
    pub fn from_settings(settings: &PapSettings) -> Self {
        Self::with_transport(HttpPapTransport::from_settings(settings))
    }
}

impl<T: PapTransport> PapDispatcher<T> {
    /// Creates a dispatcher over an explicit transport.
    pub fn with_transport(transport: T) -> Self {
        Self {
            endpoint: String::new(),
            payload: String::new(),
            auth_token: String::new(),
            password: String::new(),
            cid: String::new(),
            deliver_before: String::new(),
            transport,
            setup: false,
        }
    }

    /// Sets the gateway authentication token.
    pub fn set_auth_token(&mut self, auth_token: &str) -> &mut Self {
        self.auth_token = auth_token.to_string();
        self
    }

    /// Sets the gateway password.
    pub fn set_password(&mut self, password: &str) -> &mut Self {
        self.password = password.to_string();
        self
    }

    /// Sets the content-provider ID assigned by the carrier.
    pub fn set_content_provider_id(&mut self, cid: &str) -> &mut Self {
        self.cid = cid.to_string();
        self
    }

    /// Sets the timestamp after which the carrier drops the notification.
    pub fn set_deliver_before_timestamp(&mut self, deliver_before: &str) -> &mut Self {
        self.deliver_before = deliver_before.to_string();
        self
    }
}

#[async_trait]
impl<T: PapTransport> PushDispatcher for PapDispatcher<T> {
    type Response = PapResponse;

    fn set_endpoint(&mut self, endpoint: &str) -> &mut Self {
        self.endpoint = endpoint.to_string();
        self
    }

    fn set_payload(&mut self, payload: &str) -> &mut Self {
        self.payload = payload.to_string();
        self
    }

    async fn push(&mut self) -> AppResult<PapResponse> {
        let endpoint = mem::take(&mut self.endpoint);
        let payload = mem::take(&mut self.payload);

        if !self.setup {
            self.transport.connect().await?;
            self.setup = true;
        }

        let request = PapRequest {
            endpoint: endpoint.clone(),
            payload,
            auth_token: self.auth_token.clone(),
            password: self.password.clone(),
            content_provider_id: self.cid.clone(),
            deliver_before: self.deliver_before.clone(),
            push_id: format!("{}.{}", self.cid, Uuid::new_v4().simple()),
        };

        let outcome = self.transport.send(&request).await?;

        Ok(PapResponse::new(outcome, &endpoint))
    }
}
