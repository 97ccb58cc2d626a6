//! Command line interface for courier-rs
//!
//! One subcommand per provider; each loads the layered settings, builds a
//! payload from the flags, performs a single dispatch, and reports the
//! normalized delivery status.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{ConfigLoader, Settings};
use crate::dispatch::apns::{ApnsDispatcher, ApnsPayload};
use crate::dispatch::email::{EmailDispatcher, EmailPayload};
use crate::dispatch::pap::{PapDispatcher, PapPayload};
use crate::dispatch::{PushDispatcher, PushPayload, PushResponse, PushStatus};
use crate::error::{AppError, AppResult};
use crate::logger::init_logger;

// Include shadow-rs generated build information
use shadow_rs::shadow;
shadow!(build);

/// Custom parsers for CLI arguments
mod parsing {
    /// Parse a `key=value` pair for custom payload data
    pub fn key_value(s: &str) -> Result<(String, String), String> {
        match s.split_once('=') {
            Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
            _ => Err(format!("expected key=value, got: '{}'", s)),
        }
    }
}

/// Push notification dispatch for APNs, email, and carrier gateways
#[derive(Parser, Debug)]
#[command(name = "courier")]
#[command(about = "Send push notifications through APNs, email, or carrier gateways")]
#[command(version = build::CLAP_LONG_VERSION)]
pub struct Cli {
    /// Configuration directory (default.toml, {environment}.toml, local.toml)
    #[arg(long, env = "COURIER_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send one push through the Apple binary gateway
    Apns(ApnsArgs),
    /// Send one notification by email
    Email(EmailArgs),
    /// Send one push through the carrier (PAP) gateway
    Pap(PapArgs),
}

#[derive(Args, Debug)]
struct ApnsArgs {
    /// Hex device token of the target device
    endpoint: String,

    /// Alert text shown to the user
    #[arg(long)]
    alert: Option<String>,

    /// Badge index shown on the app icon
    #[arg(long)]
    badge: Option<u32>,

    /// Notification sound
    #[arg(long)]
    sound: Option<String>,

    /// Custom data entries, as key=value
    #[arg(long = "data", value_parser = parsing::key_value)]
    data: Vec<(String, String)>,
}

#[derive(Args, Debug)]
struct EmailArgs {
    /// Recipient address
    endpoint: String,

    /// Subject line
    #[arg(long)]
    subject: Option<String>,

    /// Message body
    #[arg(long)]
    body: Option<String>,
}

#[derive(Args, Debug)]
struct PapArgs {
    /// Carrier subscriber ID of the target device
    endpoint: String,

    /// Message text delivered to the subscriber
    #[arg(long)]
    message: Option<String>,

    /// Custom data entries, as key=value
    #[arg(long = "data", value_parser = parsing::key_value)]
    data: Vec<(String, String)>,

    /// Gateway authentication token
    #[arg(long, env = "COURIER_PAP_AUTH_TOKEN")]
    auth_token: String,

    /// Gateway password
    #[arg(long, env = "COURIER_PAP_PASSWORD")]
    password: String,

    /// Content-provider ID assigned by the carrier
    #[arg(long)]
    content_provider_id: String,

    /// Drop the notification if undelivered after this many minutes
    #[arg(long, default_value_t = 60)]
    deliver_within_mins: i64,
}

impl Cli {
    /// Loads settings, initializes logging, and runs the chosen dispatch.
    pub async fn run(self) -> AppResult<PushStatus> {
        let loader = match &self.config_dir {
            Some(dir) => ConfigLoader::with_dir(dir),
            None => ConfigLoader::new(),
        };
        let settings = loader.load()?;

        init_logger(settings.log.clone())?;

        match self.command {
            Command::Apns(args) => run_apns(&settings, args).await,
            Command::Email(args) => run_email(&settings, args).await,
            Command::Pap(args) => run_pap(&settings, args).await,
        }
    }
}

async fn run_apns(settings: &Settings, args: ApnsArgs) -> AppResult<PushStatus> {
    let mut payload = ApnsPayload::new();
    if let Some(alert) = &args.alert {
        payload.set_alert(alert);
    }
    if let Some(badge) = args.badge {
        payload.set_badge(badge);
    }
    if let Some(sound) = &args.sound {
        payload.set_sound(sound);
    }
    for (key, value) in &args.data {
        payload.set_custom_data(key, value.as_str());
    }

    let mut dispatcher = ApnsDispatcher::from_settings(&settings.apns);
    dispatcher
        .set_endpoint(&args.endpoint)
        .set_payload(&payload.serialize());

    Ok(dispatcher.push().await?.status())
}

async fn run_email(settings: &Settings, args: EmailArgs) -> AppResult<PushStatus> {
    let mut payload = EmailPayload::new();
    if let Some(subject) = &args.subject {
        payload.set_subject(subject);
    }
    if let Some(body) = &args.body {
        payload.set_body(body);
    }

    let mut dispatcher = EmailDispatcher::from_settings(&settings.email);
    dispatcher
        .set_endpoint(&args.endpoint)
        .set_payload(&payload.serialize());

    Ok(dispatcher.push().await?.status())
}

async fn run_pap(settings: &Settings, args: PapArgs) -> AppResult<PushStatus> {
    let mut payload = PapPayload::new();
    if let Some(message) = &args.message {
        payload.set_message(message);
    }
    for (key, value) in &args.data {
        payload.set_custom_data(key, value.as_str());
    }

    let mut dispatcher = PapDispatcher::from_settings(&settings.pap);
    dispatcher
        .set_auth_token(&args.auth_token)
        .set_password(&args.password)
        .set_content_provider_id(&args.content_provider_id)
        .set_deliver_before_timestamp(&deadline_after_minutes(args.deliver_within_mins)?);
    dispatcher
        .set_endpoint(&args.endpoint)
        .set_payload(&payload.serialize());

    Ok(dispatcher.push().await?.status())
}

/// Formats the carrier delivery deadline as an RFC 3339 UTC timestamp.
fn deadline_after_minutes(minutes: i64) -> AppResult<String> {
    let span = jiff::Span::new()
        .try_minutes(minutes)
        .map_err(|e| AppError::Internal { source: e.into() })?;
    let deadline = jiff::Timestamp::now()
        .checked_add(span)
        .map_err(|e| AppError::Internal { source: e.into() })?;

    Ok(deadline.to_string())
}
