//! Courier-RS Library
//!
//! Push notification dispatch toward heterogeneous delivery backends:
//! the Apple binary push gateway, SMTP email, and carrier (PAP) gateways.
//! Every backend's verdict is reduced to one shared delivery-status
//! taxonomy so callers never branch on the provider.

use shadow_rs::shadow;
shadow!(build);

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod external;
pub mod logger;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
