//! State-sync engine for the Smart Inventory dashboard.
//!
//! This crate keeps a local view of the inventory service consistent:
//!
//! - [`Dashboard`]: owns the [`DashboardState`], runs refresh cycles, tracks
//!   the selected item and acknowledges alerts
//! - [`Poller`]: visible refresh on start, silent refresh on a timer
//! - [`Config`]: layered TOML + environment configuration
//! - [`ItemListView`]: search filtering over the item list
//!
//! Collections are seeded from the durable cache on start and written back
//! after every committed refresh.

pub mod config;
pub mod dashboard;
pub mod poller;
pub mod state;
pub mod view;

pub use config::{Config, ConfigError, ValidationError};
pub use dashboard::{
    DEFAULT_REQUEST_TIMEOUT, Dashboard, DetailOutcome, RefreshMode, RefreshOutcome,
    SelectionTicket,
};
pub use poller::Poller;
pub use state::DashboardState;
pub use view::{ItemListView, filter_items};
