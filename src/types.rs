//! Wire payload types for the Track API.
//!
//! All types match the JSON bodies accepted by `track.customer.io/api/v1`.
//! Optional fields are skipped when unset, so the bodies on the wire stay
//! minimal.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Events ───────────────────────────────────────────────────────────

/// Event classification understood by the Track API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    #[default]
    Event,
    Page,
    Screen,
}

/// A customer-scoped event — body of `POST /customers/{id}/events`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackEvent {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: EventKind,

    /// Arbitrary structured payload attached to the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Seconds past epoch. When absent the API stamps the event on receipt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,

    /// Caller-assigned event id, for server-side deduplication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl TrackEvent {
    /// A plain `event`-kind event with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EventKind::Event,
            data: None,
            timestamp: None,
            id: None,
        }
    }

    /// A `screen`-kind event, as emitted by screen tracking.
    pub fn screen(name: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Screen,
            ..Self::new(name)
        }
    }

    /// A `page`-kind event.
    pub fn page(name: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Page,
            ..Self::new(name)
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_timestamp(mut self, seconds_past_epoch: i64) -> Self {
        self.timestamp = Some(seconds_past_epoch);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

// ── Push notification events ─────────────────────────────────────────

/// Lifecycle stage of a delivered push notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryEvent {
    Delivered,
    Opened,
    Converted,
}

/// A push-notification lifecycle event — body of `POST /push/events`.
///
/// Not customer-scoped: the delivery id and token identify the send
/// directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushEvent {
    /// The `CIO-Delivery-ID` from the notification payload.
    pub delivery_id: String,

    /// The `CIO-Delivery-Token` from the notification payload. The Track
    /// API calls this field `device_id`.
    pub device_id: String,

    pub event: DeliveryEvent,

    /// Seconds past epoch. When absent the API stamps the event on receipt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl PushEvent {
    pub fn new(
        delivery_id: impl Into<String>,
        delivery_token: impl Into<String>,
        event: DeliveryEvent,
    ) -> Self {
        Self {
            delivery_id: delivery_id.into(),
            device_id: delivery_token.into(),
            event,
            timestamp: None,
        }
    }

    /// An `opened` event, as reported when the user taps a notification.
    pub fn opened(delivery_id: impl Into<String>, delivery_token: impl Into<String>) -> Self {
        Self::new(delivery_id, delivery_token, DeliveryEvent::Opened)
    }
}

// ── Devices ──────────────────────────────────────────────────────────

/// Mobile platform of a registered device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePlatform {
    Ios,
    Android,
}

/// Optional device metadata accepted by the add-device endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DeviceAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_os: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cio_sdk_version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_locale: Option<String>,

    /// The API expects the strings `"true"` / `"false"` here, not booleans.
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "bool_as_string"
    )]
    pub push_enabled: Option<bool>,
}

/// A device registration record — sent as `{"device": {…}}` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Device {
    /// The push token. The Track API calls this field `id`.
    pub id: String,

    pub platform: DevicePlatform,

    /// Seconds past epoch of last use.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<DeviceAttributes>,
}

// serde's serialize_with contract requires the reference.
#[allow(clippy::ref_option)]
fn bool_as_string<S>(value: &Option<bool>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(true) => serializer.serialize_str("true"),
        Some(false) => serializer.serialize_str("false"),
        None => serializer.serialize_none(),
    }
}
