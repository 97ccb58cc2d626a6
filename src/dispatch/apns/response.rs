//! Normalizes gateway outcomes into the shared status taxonomy.

use tracing::warn;

use super::status::{ApnsErrorCode, ApnsOutcome};
use crate::dispatch::{PushResponse, PushStatus};

/// Normalized response for one Apple push.
///
/// The status is computed once at construction from the raw gateway outcome
/// and never changes. The mapping is total: codes outside the documented
/// vocabulary normalize to [`PushStatus::Error`].
#[derive(Debug)]
pub struct ApnsResponse {
    status: PushStatus,
}

impl ApnsResponse {
    /// Computes the delivery status for `outcome`.
    ///
    /// Logs exactly one warning for anything other than an accepted
    /// notification, carrying the endpoint, the normalized status, the raw
    /// code, and the gateway's description.
    pub fn new(outcome: ApnsOutcome, endpoint: &str) -> Self {
        let status = match ApnsErrorCode::from_code(outcome.code) {
            Some(ApnsErrorCode::NoError) => PushStatus::Success,
            Some(ApnsErrorCode::MissingDeviceToken | ApnsErrorCode::InvalidToken) => {
                PushStatus::InvalidEndpoint
            }
            Some(ApnsErrorCode::ProcessingError) => PushStatus::TemporaryError,
            Some(ApnsErrorCode::Unknown) => PushStatus::Unknown,
            Some(_) | None => PushStatus::Error,
        };

        if status != PushStatus::Success {
            warn!(
                endpoint,
                status = %status,
                code = outcome.code,
                description = outcome.description(),
                "push notification delivery failed"
            );
        }

        Self { status }
    }
}

impl PushResponse for ApnsResponse {
    fn status(&self) -> PushStatus {
        self.status
    }
}
