//! Data model for the Smart Inventory monitoring service.
//!
//! This crate holds the wire types shared by the HTTP gateway
//! (smartinv-core), the local cache (smartinv-store) and the dashboard
//! controller (smartinv-dashboard).
//!
//! # Example
//!
//! ```
//! use smartinv_types::{ItemsResponse, ItemStatus};
//!
//! let body = r#"{"items": [{"id": "a", "name": "Flour", "status": "low"}]}"#;
//! let response: ItemsResponse = serde_json::from_str(body).unwrap();
//! assert_eq!(response.items[0].status, ItemStatus::Low);
//! ```

pub mod error;
pub mod range;
pub mod types;

pub use error::{ParseError, ParseResult};
pub use range::{HistoryRange, RangeUnit};
pub use types::{
    Alert, AlertId, AlertsResponse, Device, DevicesResponse, HistoryResponse, Item, ItemStatus,
    ItemsResponse, Reading, Sensor, SensorsResponse,
};
