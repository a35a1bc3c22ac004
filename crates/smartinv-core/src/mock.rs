//! In-memory inventory service for testing.
//!
//! [`MockInventory`] implements [`InventoryApi`] without any network, so the
//! dashboard controller can be exercised deterministically.
//!
//! # Features
//!
//! - **Failure injection**: make any endpoint answer with an HTTP error status
//! - **Latency simulation**: delay an endpoint, or the detail/history of one item
//! - **Server-side acknowledge**: acknowledged alerts leave the active set
//! - **Call counting**: observe how often each endpoint was hit

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use smartinv_types::{Alert, AlertId, Device, HistoryRange, Item, Reading, Sensor};

use crate::error::{Error, Result};
use crate::traits::InventoryApi;

/// Endpoints of the inventory service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    ListItems,
    GetItem,
    ItemHistory,
    ActiveAlerts,
    AcknowledgeAlert,
    ListDevices,
    ListSensors,
}

impl Endpoint {
    const COUNT: usize = 7;

    fn index(self) -> usize {
        self as usize
    }
}

/// An injected HTTP failure.
#[derive(Debug, Clone)]
struct Failure {
    status: u16,
    body: String,
}

/// A mock inventory service for testing.
///
/// # Example
///
/// ```
/// use smartinv_core::{Endpoint, InventoryApi, MockInventory};
/// use smartinv_types::Item;
///
/// #[tokio::main]
/// async fn main() {
///     let service = MockInventory::new();
///     service.set_items(vec![Item::new("a", "Flour")]).await;
///     assert_eq!(service.list_items().await.unwrap().len(), 1);
///
///     service.fail(Endpoint::ListItems, 503).await;
///     assert!(service.list_items().await.is_err());
/// }
/// ```
pub struct MockInventory {
    items: RwLock<Vec<Item>>,
    details: RwLock<HashMap<String, Item>>,
    histories: RwLock<HashMap<String, Vec<Reading>>>,
    alerts: RwLock<Vec<Alert>>,
    devices: RwLock<Vec<Device>>,
    sensors: RwLock<Vec<Sensor>>,
    failures: RwLock<HashMap<Endpoint, Failure>>,
    latency: RwLock<HashMap<Endpoint, Duration>>,
    /// Extra latency for `get_item`/`item_history` of a specific item.
    item_latency: RwLock<HashMap<String, Duration>>,
    /// Range passed to the most recent `item_history` call.
    last_range: RwLock<Option<HistoryRange>>,
    calls: [AtomicU32; Endpoint::COUNT],
}

impl std::fmt::Debug for MockInventory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockInventory")
            .field("list_items_calls", &self.calls(Endpoint::ListItems))
            .finish()
    }
}

impl Default for MockInventory {
    fn default() -> Self {
        Self::new()
    }
}

impl MockInventory {
    /// Create an empty service.
    pub fn new() -> Self {
        Self {
            items: RwLock::new(Vec::new()),
            details: RwLock::new(HashMap::new()),
            histories: RwLock::new(HashMap::new()),
            alerts: RwLock::new(Vec::new()),
            devices: RwLock::new(Vec::new()),
            sensors: RwLock::new(Vec::new()),
            failures: RwLock::new(HashMap::new()),
            latency: RwLock::new(HashMap::new()),
            item_latency: RwLock::new(HashMap::new()),
            last_range: RwLock::new(None),
            calls: std::array::from_fn(|_| AtomicU32::new(0)),
        }
    }

    // --- Data ---

    pub async fn set_items(&self, items: Vec<Item>) {
        *self.items.write().await = items;
    }

    /// Override the single-item payload for an item.
    pub async fn set_detail(&self, item: Item) {
        self.details.write().await.insert(item.id.clone(), item);
    }

    pub async fn set_history(&self, item_id: &str, readings: Vec<Reading>) {
        self.histories
            .write()
            .await
            .insert(item_id.to_string(), readings);
    }

    pub async fn set_alerts(&self, alerts: Vec<Alert>) {
        *self.alerts.write().await = alerts;
    }

    pub async fn set_devices(&self, devices: Vec<Device>) {
        *self.devices.write().await = devices;
    }

    pub async fn set_sensors(&self, sensors: Vec<Sensor>) {
        *self.sensors.write().await = sensors;
    }

    /// Ids of the alerts the service currently considers active.
    pub async fn active_alert_ids(&self) -> Vec<AlertId> {
        self.alerts.read().await.iter().map(|a| a.id).collect()
    }

    /// Range of the most recent history request.
    pub async fn last_history_range(&self) -> Option<HistoryRange> {
        *self.last_range.read().await
    }

    // --- Failure injection ---

    /// Make `endpoint` answer with `status`.
    pub async fn fail(&self, endpoint: Endpoint, status: u16) {
        self.fail_with_body(endpoint, status, "Mock failure").await;
    }

    /// Make `endpoint` answer with `status` and a specific body.
    pub async fn fail_with_body(&self, endpoint: Endpoint, status: u16, body: &str) {
        self.failures.write().await.insert(
            endpoint,
            Failure {
                status,
                body: body.to_string(),
            },
        );
    }

    /// Let `endpoint` succeed again.
    pub async fn recover(&self, endpoint: Endpoint) {
        self.failures.write().await.remove(&endpoint);
    }

    /// Let every endpoint succeed again.
    pub async fn recover_all(&self) {
        self.failures.write().await.clear();
    }

    // --- Latency ---

    pub async fn set_latency(&self, endpoint: Endpoint, latency: Duration) {
        self.latency.write().await.insert(endpoint, latency);
    }

    /// Delay detail and history responses for one item.
    pub async fn set_item_latency(&self, item_id: &str, latency: Duration) {
        self.item_latency
            .write()
            .await
            .insert(item_id.to_string(), latency);
    }

    // --- Observation ---

    /// Number of calls made to `endpoint`.
    pub fn calls(&self, endpoint: Endpoint) -> u32 {
        self.calls[endpoint.index()].load(Ordering::SeqCst)
    }

    /// Count the call, apply latency, then check for an injected failure.
    async fn enter(&self, endpoint: Endpoint, item_id: Option<&str>) -> Result<()> {
        self.calls[endpoint.index()].fetch_add(1, Ordering::SeqCst);

        let mut delay = self
            .latency
            .read()
            .await
            .get(&endpoint)
            .copied()
            .unwrap_or_default();
        if let Some(id) = item_id
            && let Some(extra) = self.item_latency.read().await.get(id)
        {
            delay += *extra;
        }
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match self.failures.read().await.get(&endpoint) {
            Some(failure) => Err(Error::remote(failure.status, failure.body.clone())),
            None => Ok(()),
        }
    }
}

fn not_found(what: &str) -> Error {
    Error::remote(404, format!(r#"{{"detail":"{} not found"}}"#, what))
}

#[async_trait]
impl InventoryApi for MockInventory {
    async fn list_items(&self) -> Result<Vec<Item>> {
        self.enter(Endpoint::ListItems, None).await?;
        Ok(self.items.read().await.clone())
    }

    async fn get_item(&self, item_id: &str) -> Result<Item> {
        self.enter(Endpoint::GetItem, Some(item_id)).await?;

        if let Some(detail) = self.details.read().await.get(item_id) {
            return Ok(detail.clone());
        }
        let item = self
            .items
            .read()
            .await
            .iter()
            .find(|item| item.id == item_id)
            .cloned()
            .ok_or_else(|| not_found("Item"))?;
        let latest = self
            .histories
            .read()
            .await
            .get(item_id)
            .and_then(|readings| readings.last().cloned());

        Ok(Item {
            latest_reading: latest,
            ..item
        })
    }

    async fn item_history(&self, item_id: &str, range: HistoryRange) -> Result<Vec<Reading>> {
        self.enter(Endpoint::ItemHistory, Some(item_id)).await?;
        *self.last_range.write().await = Some(range);

        let known = self.items.read().await.iter().any(|item| item.id == item_id)
            || self.details.read().await.contains_key(item_id);
        if !known {
            return Err(not_found("Item"));
        }
        Ok(self
            .histories
            .read()
            .await
            .get(item_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn active_alerts(&self) -> Result<Vec<Alert>> {
        self.enter(Endpoint::ActiveAlerts, None).await?;
        Ok(self.alerts.read().await.clone())
    }

    async fn acknowledge_alert(&self, alert_id: AlertId) -> Result<()> {
        self.enter(Endpoint::AcknowledgeAlert, None).await?;

        let mut alerts = self.alerts.write().await;
        let before = alerts.len();
        alerts.retain(|alert| alert.id != alert_id);
        if alerts.len() == before {
            return Err(not_found("Alert"));
        }
        Ok(())
    }

    async fn list_devices(&self) -> Result<Vec<Device>> {
        self.enter(Endpoint::ListDevices, None).await?;
        Ok(self.devices.read().await.clone())
    }

    async fn list_sensors(&self) -> Result<Vec<Sensor>> {
        self.enter(Endpoint::ListSensors, None).await?;
        Ok(self.sensors.read().await.clone())
    }
}
