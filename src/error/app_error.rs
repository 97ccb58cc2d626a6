use thiserror::Error;

/// Application-wide error type covering everything that can fail around a
/// dispatch.
///
/// Provider-reported delivery rejections are deliberately absent: those are
/// normal outcomes, captured as a status inside a successfully-returned
/// response. This type is for failures of the dispatch mechanics themselves.
#[derive(Error, Debug)]
pub enum AppError {
    /// Transport-level failure: connection, session, or send mechanics
    #[error("{provider} transport failed during {operation}")]
    Transport {
        provider: &'static str,
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// A transport was used before its one-time session setup ran
    #[error("{provider} transport session not initialized")]
    SessionNotInitialized { provider: &'static str },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(error: crate::config::ConfigError) -> Self {
        AppError::Configuration {
            key: "settings".to_string(),
            source: error.into(),
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;
