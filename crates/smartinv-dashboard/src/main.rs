//! Smart Inventory dashboard - headless runner.
//!
//! Keeps the dashboard state in sync with the inventory service and logs
//! every change. Configure with `SMART_INVENTORY_*` variables or a TOML
//! file (see [`smartinv_dashboard::config`]).
//!
//! Run with: `cargo run -p smartinv-dashboard`

use std::sync::Arc;

use tracing::{info, warn};

use smartinv_core::InventoryClient;
use smartinv_dashboard::{Config, Dashboard, DashboardState, ItemListView};
use smartinv_store::CacheStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("smartinv_dashboard=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    let client = InventoryClient::new(&config.api.base_url, config.api.token.as_deref())?;
    info!(
        "Using inventory service at {} (auth: {})",
        client.base_url(),
        if client.has_token() { "bearer" } else { "none" }
    );

    let cache = if config.cache.enabled {
        info!("Opening cache at {:?}", config.cache.path);
        match CacheStore::open(&config.cache.path) {
            Ok(store) => Some(store),
            Err(e) => {
                warn!("Cache unavailable, continuing without it: {}", e);
                None
            }
        }
    } else {
        None
    };

    let dashboard = Arc::new(
        Dashboard::new(client, cache)
            .with_history_range(config.history_range())
            .with_request_timeout(config.polling.request_timeout()),
    );
    let mut updates = dashboard.subscribe();
    let poller = dashboard.start(config.polling.interval());

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut last_logged = DashboardState::default();
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutting down");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                log_changes(&last_logged, &state);
                last_logged = state;
            }
        }
    }

    poller.shutdown().await;
    Ok(())
}

/// Log what a renderer would redraw.
fn log_changes(before: &DashboardState, after: &DashboardState) {
    if after.error != before.error
        && let Some(error) = &after.error
    {
        warn!("Error: {}", error);
    }

    if after.last_refreshed != before.last_refreshed {
        let view = ItemListView::new(&after.items, "", after.selected_item_id.as_deref());
        info!(
            items = view.total,
            alerts = after.alerts.len(),
            devices = after.devices.len(),
            "Dashboard refreshed"
        );
        if after.alerts.is_empty() {
            info!("No active alerts");
        }
        for alert in &after.alerts {
            info!(alert_id = alert.id, "Alert: {}", alert.display_message());
        }
    }

    if after.selected_item != before.selected_item
        && let Some(item) = &after.selected_item
    {
        info!(
            item_id = %item.id,
            status = %item.effective_status(),
            readings = after.history.len(),
            "Selected {}",
            item.name
        );
    }
}
