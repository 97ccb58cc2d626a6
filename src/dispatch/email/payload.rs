//! Payload builder for email notifications.

use serde_json::{Map, Value};

use crate::dispatch::PushPayload;

/// Accumulates email notification content.
///
/// The field set is `subject` and `body`; unset fields are omitted from the
/// serialized payload.
#[derive(Debug, Clone, Default)]
pub struct EmailPayload {
    elements: Map<String, Value>,
}

impl EmailPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the subject line.
    pub fn set_subject(&mut self, subject: &str) -> &mut Self {
        self.elements
            .insert("subject".to_string(), Value::from(subject));
        self
    }

    /// Sets the message body.
    pub fn set_body(&mut self, body: &str) -> &mut Self {
        self.elements.insert("body".to_string(), Value::from(body));
        self
    }
}

impl PushPayload for EmailPayload {
    fn serialize(&self) -> String {
        serde_json::to_string(&self.elements).unwrap_or_else(|_| "{}".to_string())
    }
}
