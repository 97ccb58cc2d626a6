//! Payload builder for carrier push notifications.

use serde_json::{Map, Value};

use crate::dispatch::PushPayload;

/// Accumulates carrier push notification content.
///
/// The field set is `message` plus a nested `custom_data` object; the
/// serialized JSON travels as the content entity of the PAP request.
#[derive(Debug, Clone, Default)]
pub struct PapPayload {
    elements: Map<String, Value>,
}

impl PapPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the message text delivered to the subscriber.
    pub fn set_message(&mut self, message: &str) -> &mut Self {
        self.elements
            .insert("message".to_string(), Value::from(message));
        self
    }

    /// Sets one custom property under the nested `custom_data` object.
    ///
    /// Created on first use; repeated calls with the same key overwrite
    /// only that key.
    pub fn set_custom_data(&mut self, key: &str, value: impl Into<Value>) -> &mut Self {
        let custom = self
            .elements
            .entry("custom_data".to_string())
            .or_insert_with(|| Value::Object(Map::new()));

        if let Value::Object(map) = custom {
            map.insert(key.to_string(), value.into());
        }

        self
    }
}

impl PushPayload for PapPayload {
    fn serialize(&self) -> String {
        serde_json::to_string(&self.elements).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_payload_serializes_to_empty_object() {
        assert_eq!(PapPayload::new().serialize(), "{}");
    }

    #[test]
    fn test_message_and_custom_data() {
        let mut payload = PapPayload::new();
        payload
            .set_message("balance updated")
            .set_custom_data("account", "12345")
            .set_custom_data("account", "67890");

        let value: serde_json::Value = serde_json::from_str(&payload.serialize()).unwrap();
        assert_eq!(value["message"], "balance updated");
        assert_eq!(value["custom_data"], serde_json::json!({"account": "67890"}));
    }
}
