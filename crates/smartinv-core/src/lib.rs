//! Client library for the Smart Inventory monitoring service.
//!
//! This crate provides the remote data gateway used by the dashboard:
//!
//! - [`InventoryClient`]: HTTP client for the `/api/v1` REST surface
//! - [`InventoryApi`]: trait seam over the operations the dashboard consumes
//! - [`MockInventory`]: in-memory service with failure and latency injection
//! - [`Error`]: remote/transport error taxonomy
//!
//! # Quick Start
//!
//! ```no_run
//! use smartinv_core::{InventoryApi, InventoryClient};
//! use smartinv_types::HistoryRange;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = InventoryClient::new("http://localhost:8000", None)?;
//!
//!     let items = client.list_items().await?;
//!     if let Some(item) = items.first() {
//!         let history = client.item_history(&item.id, HistoryRange::default()).await?;
//!         println!("{}: {} readings", item.name, history.len());
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod mock;
pub mod traits;

pub use client::InventoryClient;
pub use error::{Error, Result};
pub use mock::{Endpoint, MockInventory};
pub use traits::InventoryApi;

// Re-export the data model for convenience.
pub use smartinv_types as types;
