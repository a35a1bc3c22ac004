//! Main cache implementation.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use serde::de::DeserializeOwned;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::schema;

/// Namespaced keys of the cached collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Items,
    Alerts,
    Devices,
    LastRefreshed,
}

impl CacheKey {
    /// Every key, in the order the dashboard writes them.
    pub const ALL: [CacheKey; 4] = [
        CacheKey::Items,
        CacheKey::Alerts,
        CacheKey::Devices,
        CacheKey::LastRefreshed,
    ];

    /// Storage key.
    pub fn as_str(self) -> &'static str {
        match self {
            CacheKey::Items => "smart-inventory.items",
            CacheKey::Alerts => "smart-inventory.alerts",
            CacheKey::Devices => "smart-inventory.devices",
            CacheKey::LastRefreshed => "smart-inventory.lastRefreshed",
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a cache read. Absence is an expected result, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
    /// A stored value decoded successfully.
    Hit(T),
    /// Nothing usable is stored under the key.
    Empty,
}

impl<T> Lookup<T> {
    pub fn is_hit(&self) -> bool {
        matches!(self, Lookup::Hit(_))
    }

    /// The value, or `fallback` when empty.
    pub fn unwrap_or(self, fallback: T) -> T {
        match self {
            Lookup::Hit(value) => value,
            Lookup::Empty => fallback,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Hit(value) => Some(value),
            Lookup::Empty => None,
        }
    }
}

/// SQLite-backed key/value cache of JSON blobs.
///
/// [`read`](Self::read) and [`write`](Self::write) never fail: a missing,
/// corrupt or unreadable entry reads as [`Lookup::Empty`], and a failed
/// write is logged and dropped.
pub struct CacheStore {
    conn: Connection,
}

impl CacheStore {
    /// Open or create a cache at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        info!("Opening cache at {}", path.display());
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        schema::initialize(&conn)?;

        Ok(Self { conn })
    }

    /// Open the default cache location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_cache_path())
    }

    /// Open an in-memory cache (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    /// Read and decode the value under `key`.
    pub fn read<T: DeserializeOwned>(&self, key: CacheKey) -> Lookup<T> {
        match self.try_read(key) {
            Ok(Some(value)) => Lookup::Hit(value),
            Ok(None) => Lookup::Empty,
            Err(e) => {
                warn!(%key, error = %e, "Ignoring unreadable cache entry");
                Lookup::Empty
            }
        }
    }

    /// Read `key`, returning `fallback` when nothing usable is stored.
    pub fn read_or<T: DeserializeOwned>(&self, key: CacheKey, fallback: T) -> T {
        self.read(key).unwrap_or(fallback)
    }

    /// Encode and store `value` under `key`, ignoring failures.
    pub fn write<T: Serialize + ?Sized>(&self, key: CacheKey, value: &T) {
        if let Err(e) = self.try_write(key, value) {
            warn!(%key, error = %e, "Failed to write cache entry");
        }
    }

    /// Fallible read. `Ok(None)` when the key is absent.
    pub fn try_read<T: DeserializeOwned>(&self, key: CacheKey) -> Result<Option<T>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM cache_entries WHERE key = ?1",
                [key.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(raw) = raw else {
            return Ok(None);
        };
        if raw.is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| Error::Serialization {
                key: key.to_string(),
                source: e,
            })
    }

    /// Fallible write.
    pub fn try_write<T: Serialize + ?Sized>(&self, key: CacheKey, value: &T) -> Result<()> {
        let encoded = serde_json::to_string(value).map_err(|e| Error::Serialization {
            key: key.to_string(),
            source: e,
        })?;

        self.conn.execute(
            "INSERT INTO cache_entries (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3",
            rusqlite::params![
                key.as_str(),
                encoded,
                OffsetDateTime::now_utc().unix_timestamp()
            ],
        )?;

        debug!(%key, bytes = encoded.len(), "Cache entry written");
        Ok(())
    }

    /// Remove the entry under `key`, ignoring failures.
    pub fn remove(&self, key: CacheKey) {
        if let Err(e) = self
            .conn
            .execute("DELETE FROM cache_entries WHERE key = ?1", [key.as_str()])
        {
            warn!(%key, error = %e, "Failed to remove cache entry");
        }
    }

    /// Store raw text under `key` without encoding it (for testing corruption).
    #[doc(hidden)]
    pub fn write_raw(&self, key: CacheKey, raw: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO cache_entries (key, value, updated_at) VALUES (?1, ?2, 0)",
            rusqlite::params![key.as_str(), raw],
        )?;
        Ok(())
    }

    /// Drop the backing table so every later access fails (for testing).
    #[doc(hidden)]
    pub fn break_storage(&self) -> Result<()> {
        self.conn.execute_batch("DROP TABLE cache_entries;")?;
        Ok(())
    }
}
