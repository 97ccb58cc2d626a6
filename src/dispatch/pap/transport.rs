//! Transport adapter for the carrier's PAP gateway.
//!
//! A push is one multipart/related HTTP POST: a PAP control entity
//! (XML addressing the subscriber) followed by the content entity (the
//! serialized payload). The gateway answers with a `push-response` XML
//! document whose result code decides the verdict.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Url;
use tracing::debug;

use crate::config::PapSettings;
use crate::error::{AppError, AppResult};
use crate::external::client::HTTP_CLIENT;

/// Request path of the gateway's push endpoint.
const PUSH_PATH: &str = "mss/PD_pushRequest";

/// Multipart boundary used for the control/content entities.
const BOUNDARY: &str = "mPsbVQo0a68eIL3OAxnm";

/// Result codes the gateway reports for an accepted push
/// (1000 accepted, 1001 accepted for processing).
const ACCEPTED_CODES: [&str; 2] = ["1000", "1001"];

static RESULT_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"code="(\d+)""#).expect("valid regex literal"));

static RESULT_DESC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"desc="([^"]*)""#).expect("valid regex literal"));

/// One fully-addressed carrier push request.
#[derive(Debug, Clone, Default)]
pub struct PapRequest {
    pub endpoint: String,
    pub payload: String,
    pub auth_token: String,
    pub password: String,
    pub content_provider_id: String,
    pub deliver_before: String,
    pub push_id: String,
}

/// Pass/fail verdict from the carrier gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PapOutcome {
    pub delivered: bool,
    /// Result description from the gateway's response document
    pub detail: Option<String>,
}

/// Provider-native send primitive for carrier push.
#[async_trait]
pub trait PapTransport: Send {
    /// One-time session setup.
    async fn connect(&mut self) -> AppResult<()>;

    /// Submits one push request and collects the gateway verdict.
    async fn send(&mut self, request: &PapRequest) -> AppResult<PapOutcome>;
}

/// Production transport over the shared HTTP client.
pub struct HttpPapTransport {
    base_url: String,
    timeout: Duration,
}

impl HttpPapTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn from_settings(settings: &PapSettings) -> Self {
        Self::new(
            &settings.gateway_url,
            Duration::from_secs(settings.timeout_seconds),
        )
    }

    fn push_url(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), PUSH_PATH)
    }

    /// Builds the PAP control entity addressing the subscriber.
    fn control_entity(request: &PapRequest) -> String {
        let deliver_before = if request.deliver_before.is_empty() {
            String::new()
        } else {
            format!(" deliver-before-timestamp=\"{}\"", request.deliver_before)
        };

        format!(
            concat!(
                "<?xml version=\"1.0\"?>\n",
                "<!DOCTYPE pap PUBLIC \"-//WAPFORUM//DTD PAP 2.1//EN\" ",
                "\"http://www.openmobilealliance.org/tech/DTD/pap_2.1.dtd\">\n",
                "<pap>\n",
                "<push-message push-id=\"{push_id}\"{deliver_before} ",
                "source-reference=\"{source}\">\n",
                "<address address-value=\"{endpoint}\"/>\n",
                "<quality-of-service delivery-method=\"confirmed\"/>\n",
                "</push-message>\n",
                "</pap>\n",
            ),
            push_id = request.push_id,
            deliver_before = deliver_before,
            source = request.content_provider_id,
            endpoint = request.endpoint,
        )
    }

    /// Assembles the multipart/related body: control entity, then content.
    fn request_body(request: &PapRequest) -> String {
        format!(
            "--{boundary}\r\n\
             Content-Type: application/xml; charset=UTF-8\r\n\r\n\
             {control}\r\n\
             --{boundary}\r\n\
             Content-Type: application/json\r\n\r\n\
             {payload}\r\n\
             --{boundary}--\r\n",
            boundary = BOUNDARY,
            control = Self::control_entity(request),
            payload = request.payload,
        )
    }

    /// Reads the gateway verdict out of the response document.
    fn parse_response(body: &str) -> PapOutcome {
        let code = RESULT_CODE
            .captures(body)
            .and_then(|captures| captures.get(1))
            .map(|code| code.as_str());

        let detail = RESULT_DESC
            .captures(body)
            .and_then(|captures| captures.get(1))
            .map(|desc| desc.as_str().to_string())
            .or_else(|| code.map(|code| format!("result code {code}")));

        PapOutcome {
            delivered: code.is_some_and(|code| ACCEPTED_CODES.contains(&code)),
            detail,
        }
    }
}

#[async_trait]
impl PapTransport for HttpPapTransport {
    async fn connect(&mut self) -> AppResult<()> {
        Url::parse(&self.base_url).map_err(|e| AppError::Configuration {
            key: "pap.gateway_url".to_string(),
            source: anyhow::Error::new(e).context(self.base_url.clone()),
        })?;

        debug!(gateway = %self.base_url, "pap transport ready");

        Ok(())
    }

    async fn send(&mut self, request: &PapRequest) -> AppResult<PapOutcome> {
        let response = HTTP_CLIENT
            .post(self.push_url())
            .basic_auth(&request.auth_token, Some(&request.password))
            .header(
                "Content-Type",
                format!("multipart/related; boundary={BOUNDARY}; type=\"application/xml\""),
            )
            .timeout(self.timeout)
            .body(Self::request_body(request))
            .send()
            .await
            .map_err(|e| AppError::Transport {
                provider: "pap",
                operation: "send",
                source: e.into(),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Ok(PapOutcome {
                delivered: false,
                detail: Some(format!("gateway returned HTTP {}", status.as_u16())),
            });
        }

        Ok(Self::parse_response(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> PapRequest {
        PapRequest {
            endpoint: "subscriber-42".to_string(),
            payload: r#"{"message":"hi"}"#.to_string(),
            auth_token: "token".to_string(),
            password: "secret".to_string(),
            content_provider_id: "cp123".to_string(),
            deliver_before: "2026-08-06T12:00:00Z".to_string(),
            push_id: "cp123.d71c3f".to_string(),
        }
    }

    #[test]
    fn test_control_entity_addresses_the_subscriber() {
        let control = HttpPapTransport::control_entity(&request());

        assert!(control.contains("push-id=\"cp123.d71c3f\""));
        assert!(control.contains("address-value=\"subscriber-42\""));
        assert!(control.contains("deliver-before-timestamp=\"2026-08-06T12:00:00Z\""));
        assert!(control.contains("source-reference=\"cp123\""));
    }

    #[test]
    fn test_control_entity_omits_empty_deadline() {
        let mut request = request();
        request.deliver_before.clear();

        let control = HttpPapTransport::control_entity(&request);

        assert!(!control.contains("deliver-before-timestamp"));
    }

    #[test]
    fn test_request_body_carries_both_entities() {
        let body = HttpPapTransport::request_body(&request());

        assert!(body.starts_with(&format!("--{BOUNDARY}\r\n")));
        assert!(body.contains("Content-Type: application/xml"));
        assert!(body.contains(r#"{"message":"hi"}"#));
        assert!(body.ends_with(&format!("--{BOUNDARY}--\r\n")));
    }

    #[test]
    fn test_parse_response_accepted_codes() {
        for code in ACCEPTED_CODES {
            let body = format!(r#"<push-response><response-result code="{code}" desc="ok"/></push-response>"#);
            let outcome = HttpPapTransport::parse_response(&body);
            assert!(outcome.delivered);
            assert_eq!(outcome.detail.as_deref(), Some("ok"));
        }
    }

    #[test]
    fn test_parse_response_rejection() {
        let body = r#"<push-response><response-result code="2001" desc="address not found"/></push-response>"#;
        let outcome = HttpPapTransport::parse_response(body);

        assert!(!outcome.delivered);
        assert_eq!(outcome.detail.as_deref(), Some("address not found"));
    }

    #[test]
    fn test_parse_response_without_result_code() {
        let outcome = HttpPapTransport::parse_response("<html>gateway error</html>");

        assert!(!outcome.delivered);
        assert_eq!(outcome.detail, None);
    }

    #[test]
    fn test_push_url_joins_cleanly() {
        let transport = HttpPapTransport::new("https://gw.example.com/", Duration::from_secs(5));
        assert_eq!(
            transport.push_url(),
            "https://gw.example.com/mss/PD_pushRequest"
        );
    }
}
