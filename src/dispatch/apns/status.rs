//! Raw status vocabulary of the Apple binary push interface.

/// Outcome the transport collected for one notification.
///
/// `code` is the numeric status from the gateway's error frame, or one of
/// the library-level codes the transport itself reports (certificate
/// rejection); `0` means the notification was accepted. Owned transiently
/// by the response normalizer and not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApnsOutcome {
    pub code: u8,
    pub message: Option<String>,
}

impl ApnsOutcome {
    /// Outcome for a notification the gateway accepted.
    pub fn accepted() -> Self {
        Self {
            code: ApnsErrorCode::NoError as u8,
            message: None,
        }
    }

    /// Outcome for a rejected notification.
    pub fn failed(code: u8, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }

    /// Human-readable description for logging.
    ///
    /// Prefers the message the gateway supplied, falling back to the
    /// documented meaning of the code.
    pub fn description(&self) -> &str {
        match &self.message {
            Some(message) => message,
            None => ApnsErrorCode::from_code(self.code)
                .map(ApnsErrorCode::description)
                .unwrap_or("unrecognized status code"),
        }
    }
}

/// Status codes documented on the binary interface, plus the library-level
/// certificate failure reported before a frame ever reaches the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ApnsErrorCode {
    NoError = 0,
    ProcessingError = 1,
    MissingDeviceToken = 2,
    MissingTopic = 3,
    MissingPayload = 4,
    InvalidTokenSize = 5,
    InvalidTopicSize = 6,
    InvalidPayloadSize = 7,
    InvalidToken = 8,
    Shutdown = 10,
    CertificateError = 100,
    Unknown = 255,
}

impl ApnsErrorCode {
    /// Maps a numeric code onto the known vocabulary.
    ///
    /// Returns `None` for codes outside it; the normalizer treats those the
    /// same as any other non-enumerated failure.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ApnsErrorCode::NoError),
            1 => Some(ApnsErrorCode::ProcessingError),
            2 => Some(ApnsErrorCode::MissingDeviceToken),
            3 => Some(ApnsErrorCode::MissingTopic),
            4 => Some(ApnsErrorCode::MissingPayload),
            5 => Some(ApnsErrorCode::InvalidTokenSize),
            6 => Some(ApnsErrorCode::InvalidTopicSize),
            7 => Some(ApnsErrorCode::InvalidPayloadSize),
            8 => Some(ApnsErrorCode::InvalidToken),
            10 => Some(ApnsErrorCode::Shutdown),
            100 => Some(ApnsErrorCode::CertificateError),
            255 => Some(ApnsErrorCode::Unknown),
            _ => None,
        }
    }

    /// Documented meaning of the code.
    pub fn description(self) -> &'static str {
        match self {
            ApnsErrorCode::NoError => "no errors encountered",
            ApnsErrorCode::ProcessingError => "processing error",
            ApnsErrorCode::MissingDeviceToken => "no device token supplied",
            ApnsErrorCode::MissingTopic => "missing topic",
            ApnsErrorCode::MissingPayload => "missing payload",
            ApnsErrorCode::InvalidTokenSize => "invalid token size",
            ApnsErrorCode::InvalidTopicSize => "invalid topic size",
            ApnsErrorCode::InvalidPayloadSize => "invalid payload size",
            ApnsErrorCode::InvalidToken => "invalid device token",
            ApnsErrorCode::Shutdown => "gateway shutting down",
            ApnsErrorCode::CertificateError => "unable to use specified certificate",
            ApnsErrorCode::Unknown => "unknown error",
        }
    }
}
