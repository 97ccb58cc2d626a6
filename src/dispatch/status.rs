//! Shared delivery-status taxonomy.

use serde::{Deserialize, Serialize};

/// Delivery outcome of a single push, independent of the provider that
/// carried it.
///
/// This is the only value that crosses the dispatch boundary back to
/// calling code. `InvalidEndpoint` tells the caller to stop retrying this
/// endpoint (e.g. drop a stale device token), `TemporaryError` that
/// retry-with-backoff is appropriate, `Unknown` and `Error` to log and move
/// on without an automatic retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PushStatus {
    /// The provider accepted the notification for delivery
    Success,
    /// The endpoint is unusable and should not be retried
    InvalidEndpoint,
    /// The provider failed transiently; a later retry may succeed
    TemporaryError,
    /// The provider reported an error outside its documented vocabulary
    Unknown,
    /// The notification was rejected for any other reason
    Error,
}

impl PushStatus {
    /// Wire-stable identifier, safe to persist or transmit
    pub fn as_str(&self) -> &'static str {
        match self {
            PushStatus::Success => "SUCCESS",
            PushStatus::InvalidEndpoint => "INVALID_ENDPOINT",
            PushStatus::TemporaryError => "TEMPORARY_ERROR",
            PushStatus::Unknown => "UNKNOWN",
            PushStatus::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for PushStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_identifiers_are_wire_stable() {
        let cases = [
            (PushStatus::Success, "\"SUCCESS\""),
            (PushStatus::InvalidEndpoint, "\"INVALID_ENDPOINT\""),
            (PushStatus::TemporaryError, "\"TEMPORARY_ERROR\""),
            (PushStatus::Unknown, "\"UNKNOWN\""),
            (PushStatus::Error, "\"ERROR\""),
        ];

        for (status, expected) in cases {
            assert_eq!(serde_json::to_string(&status).unwrap(), expected);
            let parsed: PushStatus = serde_json::from_str(expected).unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_display_matches_as_str() {
        assert_eq!(PushStatus::InvalidEndpoint.to_string(), "INVALID_ENDPOINT");
        assert_eq!(PushStatus::Success.as_str(), "SUCCESS");
    }
}
