//! Payload builder for Apple push notifications.

use serde_json::{Map, Value};

use crate::dispatch::PushPayload;

/// Accumulates Apple push notification content.
///
/// Field names are fixed by the wire contract: `alert`, `badge`, `sound`,
/// and a nested `custom_data` object. Fields that were never set are simply
/// omitted from the serialized payload.
///
/// # Example
/// ```ignore
/// let mut payload = ApnsPayload::new();
/// payload
///     .set_alert("New message")
///     .set_badge(1)
///     .set_sound("default");
/// let json = payload.serialize();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ApnsPayload {
    elements: Map<String, Value>,
}

impl ApnsPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the alert text, the actual message shown to the user.
    ///
    /// The key is named `alert` because that is its name in the byte-stream
    /// payload the gateway expects.
    pub fn set_alert(&mut self, alert: &str) -> &mut Self {
        self.elements.insert("alert".to_string(), Value::from(alert));
        self
    }

    /// Sets the badge index shown on the app icon when the message arrives.
    pub fn set_badge(&mut self, badge: u32) -> &mut Self {
        self.elements.insert("badge".to_string(), Value::from(badge));
        self
    }

    /// Sets the notification sound.
    pub fn set_sound(&mut self, sound: &str) -> &mut Self {
        self.elements.insert("sound".to_string(), Value::from(sound));
        self
    }

    /// Sets one custom property under the nested `custom_data` object.
    ///
    /// The nested object is created on first use. Repeated calls with the
    /// same key overwrite only that key; other custom-data entries are left
    /// untouched.
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

impl PushPayload for ApnsPayload {
    fn serialize(&self) -> String {
        serde_json::to_string(&self.elements).unwrap_or_else(|_| "{}".to_string())
    }
}
