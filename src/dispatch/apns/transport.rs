//! Transport adapter for the Apple binary push gateway.
//!
//! Owns the TLS session (client-certificate auth) and the enhanced
//! notification frame format: one frame out per push, an error frame back
//! only when the gateway rejects the notification. A gateway that stays
//! silent within the wait window has accepted the frame.

use std::time::Duration;

use async_trait::async_trait;
use native_tls::Identity;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_native_tls::{TlsConnector, TlsStream};
use tracing::debug;

use super::status::{ApnsErrorCode, ApnsOutcome};
use crate::config::ApnsSettings;
use crate::error::{AppError, AppResult};

/// Enhanced-format notification command.
const COMMAND_SEND: u8 = 1;

/// Error-response command sent back by the gateway.
const COMMAND_ERROR: u8 = 8;

/// Client-certificate material for the gateway session.
#[derive(Debug, Clone, Default)]
pub struct ApnsCredentials {
    /// Path of the PKCS#12 archive holding the push certificate and key
    pub certificate: String,
    /// Passphrase protecting the archive
    pub passphrase: String,
}

/// Provider-native send primitive for Apple push.
///
/// `connect` runs once per dispatcher; `send` is invoked once per push and
/// reports the gateway verdict as an [`ApnsOutcome`]. Only failures of the
/// send mechanics themselves (sockets, frame I/O) surface as errors.
#[async_trait]
pub trait ApnsTransport: Send {
    /// One-time session setup from the configured credentials.
    async fn connect(&mut self, credentials: &ApnsCredentials) -> AppResult<()>;

    /// Sends one notification frame and collects the gateway outcome.
    async fn send(&mut self, device_token: &str, payload: &[u8]) -> AppResult<ApnsOutcome>;
}

enum HandshakeError {
    /// TLS-level rejection; overwhelmingly a certificate problem
    Tls(native_tls::Error),
    /// Socket-level failure before TLS was reached
    Io(std::io::Error),
    /// `connect` was never called
    NotConnected,
}

/// Production transport: a TLS session against the binary gateway.
///
/// The session is established lazily on the first send and reused until the
/// gateway drops it; after an error frame the gateway closes the stream, so
/// the next send reconnects.
pub struct TlsApnsTransport {
    host: String,
    port: u16,
    error_wait: Duration,
    connector: Option<TlsConnector>,
    stream: Option<TlsStream<TcpStream>>,
    identifier: u32,
}

impl TlsApnsTransport {
    pub fn new(host: impl Into<String>, port: u16, error_wait: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            error_wait,
            connector: None,
            stream: None,
            identifier: 0,
        }
    }

    pub fn from_settings(settings: &ApnsSettings) -> Self {
        Self::new(
            &settings.host,
            settings.port,
            Duration::from_millis(settings.error_wait_ms),
        )
    }

    /// Decodes a hex device token into raw bytes.
    ///
    /// Returns `None` when the token is not valid hex of even length.
    fn decode_token(token: &str) -> Option<Vec<u8>> {
        let cleaned: String = token.chars().filter(|c| !c.is_whitespace()).collect();
        if cleaned.is_empty() || cleaned.len() % 2 != 0 {
            return None;
        }

        (0..cleaned.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&cleaned[i..i + 2], 16).ok())
            .collect()
    }

    /// Builds one enhanced-format notification frame.
    ///
    /// Layout: command byte, identifier, expiry, length-prefixed token,
    /// length-prefixed payload. Expiry 0 means the gateway does not store
    /// the notification for later delivery.
    fn frame(identifier: u32, token: &[u8], payload: &[u8]) -> Vec<u8> {
        let mut frame = Vec::with_capacity(11 + 2 + token.len() + 2 + payload.len());
        frame.push(COMMAND_SEND);
        frame.extend_from_slice(&identifier.to_be_bytes());
        frame.extend_from_slice(&0u32.to_be_bytes());
        frame.extend_from_slice(&(token.len() as u16).to_be_bytes());
        frame.extend_from_slice(token);
        frame.extend_from_slice(&(payload.len() as u16).to_be_bytes());
        frame.extend_from_slice(payload);
        frame
    }

    async fn handshake(&self) -> Result<TlsStream<TcpStream>, HandshakeError> {
        let connector = self.connector.as_ref().ok_or(HandshakeError::NotConnected)?;

        let tcp = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .map_err(HandshakeError::Io)?;

        connector
            .connect(&self.host, tcp)
            .await
            .map_err(HandshakeError::Tls)
    }

    /// Waits for the gateway's error frame after a send.
    ///
    /// No frame within the window means the notification was accepted; the
    /// gateway only speaks up on failure.
    async fn collect_outcome(&mut self) -> AppResult<ApnsOutcome> {
        let mut response = [0u8; 6];
        let read = {
            let stream = self
                .stream
                .as_mut()
                .ok_or(AppError::SessionNotInitialized { provider: "apns" })?;
            timeout(self.error_wait, stream.read_exact(&mut response)).await
        };

        match read {
            Err(_elapsed) => Ok(ApnsOutcome::accepted()),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                // Gateway closed the stream without an error frame.
                self.stream = None;
                Ok(ApnsOutcome::accepted())
            }
            Ok(Err(e)) => {
                self.stream = None;
                Err(AppError::Transport {
                    provider: "apns",
                    operation: "read error frame",
                    source: e.into(),
                })
            }
            Ok(Ok(_)) => {
                // After an error frame the gateway terminates the stream.
                self.stream = None;
                if response[0] == COMMAND_ERROR {
                    let code = response[1];
                    let description = ApnsErrorCode::from_code(code)
                        .map(ApnsErrorCode::description)
                        .unwrap_or("unrecognized status code");
                    Ok(ApnsOutcome::failed(code, description))
                } else {
                    Ok(ApnsOutcome::failed(
                        ApnsErrorCode::Unknown as u8,
                        "unexpected response frame from gateway",
                    ))
                }
            }
        }
    }
}

#[async_trait]
impl ApnsTransport for TlsApnsTransport {
    /// Loads the client certificate and prepares the TLS connector.
    ///
    /// The gateway session itself is established on the first send and
    /// reused afterwards, so a dispatcher pays the handshake once.
    async fn connect(&mut self, credentials: &ApnsCredentials) -> AppResult<()> {
        let archive = tokio::fs::read(&credentials.certificate)
            .await
            .map_err(|e| AppError::Configuration {
                key: "apns.certificate".to_string(),
                source: anyhow::Error::new(e)
                    .context(format!("reading {}", credentials.certificate)),
            })?;

        let identity = Identity::from_pkcs12(&archive, &credentials.passphrase).map_err(|e| {
            AppError::Configuration {
                key: "apns.certificate".to_string(),
                source: e.into(),
            }
        })?;

        let connector = native_tls::TlsConnector::builder()
            .identity(identity)
            .build()
            .map_err(|e| AppError::Transport {
                provider: "apns",
                operation: "session setup",
                source: e.into(),
            })?;

        self.connector = Some(TlsConnector::from(connector));

        debug!(host = %self.host, port = self.port, "apns transport ready");

        Ok(())
    }

    async fn send(&mut self, device_token: &str, payload: &[u8]) -> AppResult<ApnsOutcome> {
        if device_token.trim().is_empty() {
            return Ok(ApnsOutcome::failed(
                ApnsErrorCode::MissingDeviceToken as u8,
                ApnsErrorCode::MissingDeviceToken.description(),
            ));
        }

        let token = match Self::decode_token(device_token) {
            Some(token) => token,
            None => {
                return Ok(ApnsOutcome::failed(
                    ApnsErrorCode::InvalidToken as u8,
                    ApnsErrorCode::InvalidToken.description(),
                ));
            }
        };

        if self.stream.is_none() {
            match self.handshake().await {
                Ok(stream) => self.stream = Some(stream),
                // The gateway refusing the TLS session is a provider verdict
                // on our credentials, not a failure of the send mechanics.
                Err(HandshakeError::Tls(e)) => {
                    return Ok(ApnsOutcome::failed(
                        ApnsErrorCode::CertificateError as u8,
                        e.to_string(),
                    ));
                }
                Err(HandshakeError::Io(e)) => {
                    return Err(AppError::Transport {
                        provider: "apns",
                        operation: "connect",
                        source: e.into(),
                    });
                }
                Err(HandshakeError::NotConnected) => {
                    return Err(AppError::SessionNotInitialized { provider: "apns" });
                }
            }
        }

        self.identifier = self.identifier.wrapping_add(1);
        let frame = Self::frame(self.identifier, &token, payload);

        let written = {
            let stream = self
                .stream
                .as_mut()
                .ok_or(AppError::SessionNotInitialized { provider: "apns" })?;
            match stream.write_all(&frame).await {
                Ok(()) => stream.flush().await,
                Err(e) => Err(e),
            }
        };

        if let Err(e) = written {
            self.stream = None;
            return Err(AppError::Transport {
                provider: "apns",
                operation: "send",
                source: e.into(),
            });
        }

        self.collect_outcome().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> TlsApnsTransport {
        TlsApnsTransport::new("gateway.invalid", 2195, Duration::from_millis(50))
    }

    #[test]
    fn test_decode_token() {
        assert_eq!(
            TlsApnsTransport::decode_token("48656c6c6f"),
            Some(b"Hello".to_vec())
        );
        assert_eq!(TlsApnsTransport::decode_token("ABCDEF"), Some(vec![0xab, 0xcd, 0xef]));
        assert_eq!(TlsApnsTransport::decode_token("abc"), None);
        assert_eq!(TlsApnsTransport::decode_token("zz"), None);
        assert_eq!(TlsApnsTransport::decode_token(""), None);
    }

    #[test]
    fn test_frame_layout() {
        let frame = TlsApnsTransport::frame(7, &[0xaa, 0xbb], b"{}");

        assert_eq!(frame[0], COMMAND_SEND);
        assert_eq!(&frame[1..5], &7u32.to_be_bytes());
        assert_eq!(&frame[5..9], &0u32.to_be_bytes());
        assert_eq!(&frame[9..11], &2u16.to_be_bytes());
        assert_eq!(&frame[11..13], [0xaa, 0xbb]);
        assert_eq!(&frame[13..15], &2u16.to_be_bytes());
        assert_eq!(&frame[15..], b"{}");
    }

    #[tokio::test]
    async fn test_missing_token_reported_without_network() {
        let outcome = transport().send("", b"{}").await.unwrap();
        assert_eq!(outcome.code, ApnsErrorCode::MissingDeviceToken as u8);
    }

    #[tokio::test]
    async fn test_malformed_token_reported_without_network() {
        let outcome = transport().send("not-hex", b"{}").await.unwrap();
        assert_eq!(outcome.code, ApnsErrorCode::InvalidToken as u8);
    }

    #[tokio::test]
    async fn test_send_before_connect_is_an_error() {
        let result = transport().send("48656c6c6f", b"{}").await;
        assert!(matches!(
            result,
            Err(AppError::SessionNotInitialized { provider: "apns" })
        ));
    }
}
