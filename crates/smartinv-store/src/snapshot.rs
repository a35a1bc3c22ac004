//! Typed access to the dashboard's cached collections.

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::warn;

use smartinv_types::{Alert, Device, Item};

use crate::error::{Error, Result};
use crate::store::{CacheKey, CacheStore};

/// The last good refresh as persisted on disk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CachedSnapshot {
    pub items: Vec<Item>,
    pub alerts: Vec<Alert>,
    pub devices: Vec<Device>,
    pub last_refreshed: Option<OffsetDateTime>,
}

impl CachedSnapshot {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
            && self.alerts.is_empty()
            && self.devices.is_empty()
            && self.last_refreshed.is_none()
    }
}

impl CacheStore {
    /// Load every cached collection.
    ///
    /// Entries are read independently: a corrupt alerts entry does not
    /// discard cached items.
    pub fn load_snapshot(&self) -> CachedSnapshot {
        CachedSnapshot {
            items: self.read_or(CacheKey::Items, Vec::new()),
            alerts: self.read_or(CacheKey::Alerts, Vec::new()),
            devices: self.read_or(CacheKey::Devices, Vec::new()),
            last_refreshed: self.last_refreshed(),
        }
    }

    /// Persist the three primary collections.
    pub fn save_collections(&self, items: &[Item], alerts: &[Alert], devices: &[Device]) {
        self.write(CacheKey::Items, items);
        self.write(CacheKey::Alerts, alerts);
        self.write(CacheKey::Devices, devices);
    }

    /// Persist the time of the last successful refresh.
    pub fn save_last_refreshed(&self, at: OffsetDateTime) {
        match at.format(&Rfc3339) {
            Ok(formatted) => self.write(CacheKey::LastRefreshed, &formatted),
            Err(e) => warn!(error = %e, "Failed to format refresh timestamp"),
        }
    }

    /// Cached time of the last successful refresh.
    pub fn last_refreshed(&self) -> Option<OffsetDateTime> {
        match self.try_last_refreshed() {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable refresh timestamp");
                None
            }
        }
    }

    fn try_last_refreshed(&self) -> Result<Option<OffsetDateTime>> {
        let Some(raw) = self.try_read::<String>(CacheKey::LastRefreshed)? else {
            return Ok(None);
        };
        OffsetDateTime::parse(&raw, &Rfc3339)
            .map(Some)
            .map_err(|_| Error::InvalidTimestamp(raw))
    }
}
