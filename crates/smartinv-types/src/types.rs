//! Core types for Smart Inventory data.

use core::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::OffsetDateTime;

/// Stock status of an item, derived server-side from its sensor state.
///
/// Unrecognised or missing values map to [`ItemStatus::Unknown`] so that a
/// new server-side state never breaks decoding of the whole item list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ItemStatus {
    /// Stock level is fine.
    Ok,
    /// Stock is running low.
    Low,
    /// Item is out of stock.
    Out,
    /// No reading yet, or a state this client does not know.
    #[default]
    Unknown,
}

impl ItemStatus {
    /// Parse a wire value, falling back to `Unknown`.
    ///
    /// # Examples
    ///
    /// ```
    /// use smartinv_types::ItemStatus;
    ///
    /// assert_eq!(ItemStatus::from_wire("low"), ItemStatus::Low);
    /// assert_eq!(ItemStatus::from_wire("OUT"), ItemStatus::Out);
    /// assert_eq!(ItemStatus::from_wire("sideways"), ItemStatus::Unknown);
    /// ```
    #[must_use]
    pub fn from_wire(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "ok" => ItemStatus::Ok,
            "low" => ItemStatus::Low,
            "out" => ItemStatus::Out,
            _ => ItemStatus::Unknown,
        }
    }

    /// Wire representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Ok => "ok",
            ItemStatus::Low => "low",
            ItemStatus::Out => "out",
            ItemStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ItemStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ItemStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.as_deref().map(ItemStatus::from_wire).unwrap_or_default())
    }
}

/// A single timestamped observation from a sensor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Device-assigned sequence number, when the device sent one.
    #[serde(default)]
    pub seq_id: Option<u64>,
    /// When the observation was taken.
    #[serde(with = "time::serde::rfc3339")]
    pub ts: OffsetDateTime,
    /// Discrete sensor state (e.g. "ok", "low").
    pub state: String,
    /// Value normalised to the item's scale.
    #[serde(default)]
    pub normalized_value: Option<f64>,
    /// Raw sensor value.
    #[serde(default)]
    pub raw_value: Option<f64>,
}

/// A monitored physical asset.
///
/// The list endpoint fills `status`/`last_update`/`last_value`; the
/// single-item endpoint fills `latest_reading` instead. Both decode into
/// this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: ItemStatus,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_update: Option<OffsetDateTime>,
    #[serde(default)]
    pub sensor_id: Option<String>,
    #[serde(default)]
    pub latest_reading: Option<Reading>,
    /// Last raw value reported by the item's sensor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_value: Option<f64>,
    /// Unit of the normalised value (e.g. "kg").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Item {
    /// Create an item with only an id and a name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: ItemStatus::Unknown,
            last_update: None,
            sensor_id: None,
            latest_reading: None,
            last_value: None,
            unit: None,
            image_url: None,
        }
    }

    /// Status to show for a detail view: the latest reading's state if
    /// present, otherwise the list status.
    #[must_use]
    pub fn effective_status(&self) -> ItemStatus {
        self.latest_reading
            .as_ref()
            .map(|r| ItemStatus::from_wire(&r.state))
            .unwrap_or(self.status)
    }
}

/// Identifier of an alert.
pub type AlertId = i64;

/// A service-raised condition tied to an item, active until acknowledged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: AlertId,
    #[serde(default)]
    pub message: Option<String>,
    /// Name of the item the alert belongs to, if it still exists.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_id: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Alert {
    /// Message to display, falling back to a generic label.
    #[must_use]
    pub fn display_message(&self) -> &str {
        self.message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or("Alert")
    }
}

/// A physical reporting unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    #[serde(default)]
    pub firmware: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_seen: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// A sensor attached to a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub id: String,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub last_state: Option<String>,
    #[serde(default)]
    pub last_value: Option<f64>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_update: Option<OffsetDateTime>,
}

// ==========================================================================
// Response envelopes
// ==========================================================================

/// `GET /api/v1/items`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemsResponse {
    #[serde(default)]
    pub items: Vec<Item>,
}

/// `GET /api/v1/alerts`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertsResponse {
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

/// `GET /api/v1/devices`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevicesResponse {
    #[serde(default)]
    pub devices: Vec<Device>,
}

/// `GET /api/v1/sensors`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorsResponse {
    #[serde(default)]
    pub sensors: Vec<Sensor>,
}

/// `GET /api/v1/items/{id}/history`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub item_id: Option<String>,
    #[serde(default)]
    pub readings: Vec<Reading>,
}
