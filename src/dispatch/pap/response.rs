//! Normalizes carrier gateway verdicts into the shared status taxonomy.

use tracing::warn;

use super::transport::PapOutcome;
use crate::dispatch::{PushResponse, PushStatus};

/// Normalized response for one carrier push.
#[derive(Debug)]
pub struct PapResponse {
    status: PushStatus,
}

impl PapResponse {
    /// Computes the delivery status from the gateway verdict, logging one
    /// warning with the subscriber endpoint on failure.
    pub fn new(outcome: PapOutcome, endpoint: &str) -> Self {
        let status = if outcome.delivered {
            PushStatus::Success
        } else {
            warn!(
                endpoint,
                description = outcome.detail.as_deref().unwrap_or("no result code in gateway response"),
                "carrier push delivery failed"
            );
            PushStatus::Error
        };

        Self { status }
    }
}

impl PushResponse for PapResponse {
    fn status(&self) -> PushStatus {
        self.status
    }
}
