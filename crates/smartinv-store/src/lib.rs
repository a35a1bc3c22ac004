//! Durable local cache for the Smart Inventory dashboard.
//!
//! This crate persists the last good refresh (items, alerts, devices and the
//! refresh timestamp) so a restarted dashboard can show data before the
//! service answers. It is an acceleration layer, never a source of truth:
//! every read failure degrades to "nothing cached" and every write failure
//! is logged and dropped.
//!
//! # Example
//!
//! ```no_run
//! use smartinv_store::{CacheKey, CacheStore, Lookup};
//! use smartinv_types::Item;
//!
//! let cache = CacheStore::open_default()?;
//!
//! match cache.read::<Vec<Item>>(CacheKey::Items) {
//!     Lookup::Hit(items) => println!("{} cached items", items.len()),
//!     Lookup::Empty => println!("nothing cached yet"),
//! }
//! # Ok::<(), smartinv_store::Error>(())
//! ```

mod error;
mod schema;
mod snapshot;
mod store;

pub use error::{Error, Result};
pub use snapshot::CachedSnapshot;
pub use store::{CacheKey, CacheStore, Lookup};

/// Default cache path following platform conventions.
///
/// - Linux: `~/.local/share/smart-inventory/cache.db`
/// - macOS: `~/Library/Application Support/smart-inventory/cache.db`
/// - Windows: `C:\Users\<user>\AppData\Local\smart-inventory\cache.db`
pub fn default_cache_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("smart-inventory")
        .join("cache.db")
}
