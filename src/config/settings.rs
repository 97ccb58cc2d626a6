//! Configuration settings structures for courier-rs
//!
//! Defines all configuration structures that can be loaded from TOML files
//! and environment variables.

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::LoggerConfig;

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "courier-rs".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_apns_host() -> String {
    "gateway.push.apple.com".to_string()
}

fn default_apns_port() -> u16 {
    2195
}

fn default_error_wait_ms() -> u64 {
    500
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_pap_timeout() -> u64 {
    30
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Application version
    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Provider Configuration
// ============================================================================

/// Apple push gateway configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApnsSettings {
    /// Push gateway host
    #[serde(default = "default_apns_host")]
    pub host: String,

    /// Push gateway port
    #[serde(default = "default_apns_port")]
    pub port: u16,

    /// Path of the PKCS#12 archive with the push certificate and key
    #[serde(default)]
    pub certificate: String,

    /// Passphrase protecting the certificate archive
    #[serde(default)]
    pub passphrase: String,

    /// How long to wait for the gateway's error frame after a send.
    /// The gateway stays silent for accepted notifications.
    #[serde(default = "default_error_wait_ms")]
    pub error_wait_ms: u64,
}

impl Default for ApnsSettings {
    fn default() -> Self {
        Self {
            host: default_apns_host(),
            port: default_apns_port(),
            certificate: String::new(),
            passphrase: String::new(),
            error_wait_ms: default_error_wait_ms(),
        }
    }
}

impl ApnsSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::validation("apns.host", "host cannot be empty"));
        }

        if self.port == 0 {
            return Err(ConfigError::validation("apns.port", "port cannot be 0"));
        }

        if self.error_wait_ms == 0 {
            return Err(ConfigError::validation(
                "apns.error_wait_ms",
                "error wait window must be positive",
            ));
        }

        Ok(())
    }
}

/// SMTP relay configuration for email notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailSettings {
    /// SMTP relay host
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,

    /// SMTP relay port
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// Relay username; authentication is skipped when empty
    #[serde(default)]
    pub username: String,

    /// Relay password
    #[serde(default)]
    pub password: String,

    /// Sender address for outgoing notifications
    #[serde(default)]
    pub source: String,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
            source: String::new(),
        }
    }
}

impl EmailSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smtp_host.is_empty() {
            return Err(ConfigError::validation(
                "email.smtp_host",
                "SMTP host cannot be empty",
            ));
        }

        if self.smtp_port == 0 {
            return Err(ConfigError::validation(
                "email.smtp_port",
                "SMTP port cannot be 0",
            ));
        }

        Ok(())
    }
}

/// Carrier (PAP) gateway configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PapSettings {
    /// Base URL of the carrier gateway
    #[serde(default)]
    pub gateway_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_pap_timeout")]
    pub timeout_seconds: u64,
}

impl Default for PapSettings {
    fn default() -> Self {
        Self {
            gateway_url: String::new(),
            timeout_seconds: default_pap_timeout(),
        }
    }
}

impl PapSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout_seconds == 0 {
            return Err(ConfigError::validation(
                "pap.timeout_seconds",
                "timeout must be positive",
            ));
        }

        Ok(())
    }
}

// ============================================================================
// Root Settings
// ============================================================================

/// Root settings structure aggregating all configuration sections
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: ApplicationConfig,

    #[serde(default)]
    pub log: LoggerConfig,

    #[serde(default)]
    pub apns: ApnsSettings,

    #[serde(default)]
    pub email: EmailSettings,

    #[serde(default)]
    pub pap: PapSettings,
}

impl Settings {
    /// Validates the loaded settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.log
            .validate()
            .map_err(|e| ConfigError::validation("log", e.to_string().as_str()))?;
        self.apns.validate()?;
        self.email.validate()?;
        self.pap.validate()?;

        Ok(())
    }
}
