//! Trait abstraction over the inventory service.
//!
//! [`InventoryApi`] is implemented by the HTTP [`InventoryClient`] and by
//! [`MockInventory`](crate::MockInventory), so the dashboard controller can
//! be driven against either.

use std::sync::Arc;

use async_trait::async_trait;

use smartinv_types::{Alert, AlertId, Device, HistoryRange, Item, Reading, Sensor};

use crate::client::InventoryClient;
use crate::error::Result;

/// Operations the dashboard consumes from the inventory service.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    /// List all items.
    async fn list_items(&self) -> Result<Vec<Item>>;

    /// Get one item with its latest reading.
    async fn get_item(&self, item_id: &str) -> Result<Item>;

    /// Readings of an item within `range`, oldest first.
    async fn item_history(&self, item_id: &str, range: HistoryRange) -> Result<Vec<Reading>>;

    /// Alerts that are still active.
    async fn active_alerts(&self) -> Result<Vec<Alert>>;

    /// Acknowledge an active alert.
    async fn acknowledge_alert(&self, alert_id: AlertId) -> Result<()>;

    /// List reporting devices.
    async fn list_devices(&self) -> Result<Vec<Device>>;

    /// List sensors.
    async fn list_sensors(&self) -> Result<Vec<Sensor>>;
}

#[async_trait]
impl InventoryApi for InventoryClient {
    async fn list_items(&self) -> Result<Vec<Item>> {
        InventoryClient::list_items(self).await
    }

    async fn get_item(&self, item_id: &str) -> Result<Item> {
        InventoryClient::get_item(self, item_id).await
    }

    async fn item_history(&self, item_id: &str, range: HistoryRange) -> Result<Vec<Reading>> {
        InventoryClient::item_history(self, item_id, range).await
    }

    async fn active_alerts(&self) -> Result<Vec<Alert>> {
        InventoryClient::active_alerts(self).await
    }

    async fn acknowledge_alert(&self, alert_id: AlertId) -> Result<()> {
        InventoryClient::acknowledge_alert(self, alert_id).await
    }

    async fn list_devices(&self) -> Result<Vec<Device>> {
        InventoryClient::list_devices(self).await
    }

    async fn list_sensors(&self) -> Result<Vec<Sensor>> {
        InventoryClient::list_sensors(self).await
    }
}

#[async_trait]
impl<T: InventoryApi + ?Sized> InventoryApi for Arc<T> {
    async fn list_items(&self) -> Result<Vec<Item>> {
        (**self).list_items().await
    }

    async fn get_item(&self, item_id: &str) -> Result<Item> {
        (**self).get_item(item_id).await
    }

    async fn item_history(&self, item_id: &str, range: HistoryRange) -> Result<Vec<Reading>> {
        (**self).item_history(item_id, range).await
    }

    async fn active_alerts(&self) -> Result<Vec<Alert>> {
        (**self).active_alerts().await
    }

    async fn acknowledge_alert(&self, alert_id: AlertId) -> Result<()> {
        (**self).acknowledge_alert(alert_id).await
    }

    async fn list_devices(&self) -> Result<Vec<Device>> {
        (**self).list_devices().await
    }

    async fn list_sensors(&self) -> Result<Vec<Sensor>> {
        (**self).list_sensors().await
    }
}
