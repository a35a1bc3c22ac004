//! Dashboard state snapshot.
//!
//! [`DashboardState`] is a plain value. The [`Dashboard`](crate::Dashboard)
//! controller owns the only mutable copy and publishes clones of it; the
//! transition methods here are the only way it changes, and each of them
//! replaces whole fields.

use time::OffsetDateTime;

use smartinv_store::CachedSnapshot;
use smartinv_types::{Alert, Device, Item, Reading};

/// Everything a renderer needs to draw the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    /// Items from the last committed refresh (or the cache).
    pub items: Vec<Item>,
    /// Active alerts from the last committed refresh.
    pub alerts: Vec<Alert>,
    /// Devices from the last committed refresh.
    pub devices: Vec<Device>,
    /// Currently selected item.
    pub selected_item_id: Option<String>,
    /// Detail payload of the selected item.
    pub selected_item: Option<Item>,
    /// History of the selected item, oldest first.
    pub history: Vec<Reading>,
    /// When the last refresh committed.
    pub last_refreshed: Option<OffsetDateTime>,
    /// Most recent failure, shown as a banner.
    pub error: Option<String>,
    /// A visible refresh is running.
    pub loading: bool,
}

impl DashboardState {
    /// Seed state from the cache, selecting the first cached item.
    pub fn from_cache(snapshot: CachedSnapshot) -> Self {
        let selected_item_id = snapshot.items.first().map(|item| item.id.clone());
        Self {
            items: snapshot.items,
            alerts: snapshot.alerts,
            devices: snapshot.devices,
            selected_item_id,
            last_refreshed: snapshot.last_refreshed,
            ..Self::default()
        }
    }

    /// Look up an item by id.
    pub fn item(&self, item_id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn contains_item(&self, item_id: &str) -> bool {
        self.item(item_id).is_some()
    }

    /// The selected item as it appears in the item list.
    pub fn selected_list_item(&self) -> Option<&Item> {
        self.selected_item_id.as_deref().and_then(|id| self.item(id))
    }

    /// Start of a refresh cycle.
    pub(crate) fn begin_refresh(&mut self, visible: bool) {
        if visible {
            self.loading = true;
        }
        self.error = None;
    }

    /// Replace the three collections together.
    ///
    /// Returns the id that was auto-selected, if the selection was empty and
    /// the new item list is not.
    pub(crate) fn commit_refresh(
        &mut self,
        items: Vec<Item>,
        alerts: Vec<Alert>,
        devices: Vec<Device>,
        now: OffsetDateTime,
    ) -> Option<String> {
        self.items = items;
        self.alerts = alerts;
        self.devices = devices;
        self.last_refreshed = Some(match self.last_refreshed {
            Some(previous) if previous > now => previous,
            _ => now,
        });

        if self.selected_item_id.is_none() {
            self.selected_item_id = self.items.first().map(|item| item.id.clone());
            return self.selected_item_id.clone();
        }
        None
    }

    /// Record a failure, replacing any previous one.
    pub(crate) fn fail(&mut self, message: String) {
        self.error = Some(message);
    }

    /// End of a refresh cycle.
    pub(crate) fn end_refresh(&mut self, visible: bool) {
        if visible {
            self.loading = false;
        }
    }

    /// Change the selection. Clearing it also clears detail and history.
    pub(crate) fn select(&mut self, item_id: Option<String>) {
        if item_id.is_none() {
            self.selected_item = None;
            self.history.clear();
        }
        self.selected_item_id = item_id;
    }

    /// Replace detail and history of the selection, clearing any error.
    pub(crate) fn apply_detail(&mut self, item: Item, history: Vec<Reading>) {
        self.selected_item = Some(item);
        self.history = history;
        self.error = None;
    }
}
