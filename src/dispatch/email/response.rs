//! Normalizes email delivery verdicts into the shared status taxonomy.

use tracing::warn;

use crate::dispatch::{PushResponse, PushStatus};

/// Normalized response for one email notification.
///
/// Email delivery is two-valued: the message was either handed off or it
/// was not.
#[derive(Debug)]
pub struct EmailResponse {
    status: PushStatus,
}

impl EmailResponse {
    /// Computes the delivery status from the mail collaborator's verdict,
    /// logging one warning with the target address on failure.
    pub fn new(delivered: bool, endpoint: &str) -> Self {
        let status = if delivered {
            PushStatus::Success
        } else {
            warn!(endpoint, "email notification delivery failed");
            PushStatus::Error
        };

        Self { status }
    }
}

impl PushResponse for EmailResponse {
    fn status(&self) -> PushStatus {
        self.status
    }
}
