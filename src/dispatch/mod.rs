//! Push notification dispatch with per-provider backends.
//!
//! One payload builder, dispatcher, and response normalizer per delivery
//! backend: the APNs binary gateway, SMTP email, and the carrier push (PAP)
//! gateway. Callers configure a dispatcher, call `push()`, and branch on the
//! shared [`PushStatus`] without knowing which backend did the work.
//!
//! Provider-reported rejections are normal outcomes and come back as a
//! non-success status inside the response; only failures of the dispatch
//! mechanics themselves (connection, session, send) surface as errors.

pub mod apns;
pub mod email;
pub mod pap;
mod status;

pub use status::PushStatus;

use crate::error::AppResult;
use async_trait::async_trait;

/// Builder for provider-specific notification content.
///
/// Setters accumulate fields into an internal mapping and return the builder
/// for call chaining; nothing is validated at build time.
pub trait PushPayload {
    /// Serializes the accumulated fields to the provider wire format.
    ///
    /// Non-mutating and idempotent: calling this twice without an
    /// intervening setter call yields identical output. An empty builder
    /// serializes to an empty JSON object.
    fn serialize(&self) -> String;
}

/// Normalized outcome of a single push.
pub trait PushResponse {
    /// The delivery status computed when the response was constructed.
    ///
    /// Pure accessor; the status never changes after construction.
    fn status(&self) -> PushStatus;
}

/// One send to one endpoint via a specific provider transport.
///
/// Dispatchers are single-caller units: `push(&mut self)` makes concurrent
/// use of one instance a compile error. Fan-out means one dispatcher per
/// unit of concurrency.
#[async_trait]
pub trait PushDispatcher {
    type Response: PushResponse;

    /// Queues the destination endpoint for the next push.
    ///
    /// The meaning is provider-specific: a device token, an email address,
    /// or a carrier subscriber ID.
    fn set_endpoint(&mut self, endpoint: &str) -> &mut Self;

    /// Queues the serialized payload for the next push.
    fn set_payload(&mut self, payload: &str) -> &mut Self;

    /// Performs one send to the configured endpoint.
    ///
    /// Transport setup runs lazily on the first call and the session is
    /// reused afterwards. Endpoint and payload are cleared on every exit
    /// path, success or failure, so the dispatcher can be reused for the
    /// next notification without leaking state. Credentials persist across
    /// sends.
    async fn push(&mut self) -> AppResult<Self::Response>;
}
