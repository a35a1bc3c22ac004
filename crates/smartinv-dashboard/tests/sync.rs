//! End-to-end behaviour of the dashboard against an in-memory service.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use time::OffsetDateTime;
use tokio::time::sleep;

use smartinv_core::{Endpoint, MockInventory};
use smartinv_dashboard::{
    Dashboard, DetailOutcome, ItemListView, Poller, RefreshMode, RefreshOutcome,
};
use smartinv_store::CacheStore;
use smartinv_types::{Alert, AlertId, Device, HistoryRange, Item, Reading};

type TestDashboard = Dashboard<Arc<MockInventory>>;

fn alert(id: AlertId, message: &str) -> Alert {
    Alert {
        id,
        message: Some(message.to_string()),
        name: None,
        created_at: OffsetDateTime::UNIX_EPOCH,
        item_id: None,
        sensor_id: None,
        kind: None,
        status: Some("active".to_string()),
    }
}

fn device(id: &str) -> Device {
    Device {
        id: id.to_string(),
        firmware: Some("1.0.0".to_string()),
        last_seen: None,
        name: None,
        location: None,
    }
}

fn reading(seq_id: u64, state: &str) -> Reading {
    Reading {
        seq_id: Some(seq_id),
        ts: OffsetDateTime::UNIX_EPOCH + time::Duration::minutes(seq_id as i64),
        state: state.to_string(),
        normalized_value: Some(0.5),
        raw_value: Some(500.0),
    }
}

fn names(items: &[Item]) -> Vec<&str> {
    items.iter().map(|i| i.name.as_str()).collect()
}

async fn service_with(items: &[(&str, &str)]) -> Arc<MockInventory> {
    let service = Arc::new(MockInventory::new());
    service
        .set_items(items.iter().map(|(id, name)| Item::new(*id, *name)).collect())
        .await;
    service
        .set_alerts(vec![alert(1, "Flour low"), alert(2, "Sugar out")])
        .await;
    service.set_devices(vec![device("pi-kitchen")]).await;
    service
}

fn dashboard(service: &Arc<MockInventory>) -> TestDashboard {
    Dashboard::new(Arc::clone(service), None)
}

// ==========================================================================
// Refresh
// ==========================================================================

#[tokio::test]
async fn test_refresh_commits_all_collections() {
    let service = service_with(&[("a", "Flour"), ("b", "Sugar")]).await;
    let dashboard = dashboard(&service);

    let outcome = dashboard.refresh(RefreshMode::Visible).await;
    assert_eq!(
        outcome,
        RefreshOutcome::Committed {
            auto_selected: Some("a".to_string())
        }
    );

    let state = dashboard.snapshot();
    assert_eq!(names(&state.items), vec!["Flour", "Sugar"]);
    assert_eq!(state.alerts.len(), 2);
    assert_eq!(state.devices.len(), 1);
    assert!(state.last_refreshed.is_some());
    assert!(state.error.is_none());
    assert!(!state.loading);
}

#[tokio::test]
async fn test_partial_failure_commits_nothing() {
    let service = service_with(&[("a", "Flour")]).await;
    let dashboard = dashboard(&service);
    dashboard.refresh(RefreshMode::Visible).await;
    let before = dashboard.snapshot();

    service
        .set_items(vec![Item::new("a", "Flour"), Item::new("z", "Zucchini")])
        .await;
    service.set_devices(vec![]).await;
    service.fail(Endpoint::ActiveAlerts, 500).await;

    let outcome = dashboard.refresh(RefreshMode::Visible).await;
    assert_eq!(
        outcome,
        RefreshOutcome::Failed("500 Internal Server Error: Mock failure".to_string())
    );

    let after = dashboard.snapshot();
    assert_eq!(after.items, before.items);
    assert_eq!(after.alerts, before.alerts);
    assert_eq!(after.devices, before.devices);
    assert_eq!(after.last_refreshed, before.last_refreshed);
    assert_eq!(
        after.error.as_deref(),
        Some("500 Internal Server Error: Mock failure")
    );
    assert!(!after.loading);
}

#[tokio::test]
async fn test_error_cleared_by_next_successful_refresh() {
    let service = service_with(&[("a", "Flour")]).await;
    let dashboard = dashboard(&service);

    service.fail(Endpoint::ListDevices, 503).await;
    dashboard.refresh(RefreshMode::Visible).await;
    assert!(dashboard.snapshot().error.is_some());

    service.recover_all().await;
    let outcome = dashboard.refresh(RefreshMode::Silent).await;
    assert!(outcome.is_committed());
    assert!(dashboard.snapshot().error.is_none());
}

#[tokio::test]
async fn test_empty_collections_are_not_errors() {
    let service = Arc::new(MockInventory::new());
    let dashboard = dashboard(&service);

    let outcome = dashboard.refresh(RefreshMode::Visible).await;
    assert_eq!(
        outcome,
        RefreshOutcome::Committed {
            auto_selected: None
        }
    );

    let state = dashboard.snapshot();
    assert!(state.items.is_empty());
    assert!(state.alerts.is_empty());
    assert!(state.error.is_none());
    assert!(state.selected_item_id.is_none());
    assert!(ItemListView::new(&state.items, "", None).show_empty_state());
}

#[tokio::test(start_paused = true)]
async fn test_loading_flag_only_for_visible_refresh() {
    let service = service_with(&[("a", "Flour")]).await;
    service
        .set_latency(Endpoint::ListItems, Duration::from_millis(100))
        .await;
    let dashboard = dashboard(&service);

    let (_, during) = tokio::join!(dashboard.refresh(RefreshMode::Visible), async {
        sleep(Duration::from_millis(50)).await;
        dashboard.snapshot()
    });
    assert!(during.loading);
    assert!(!dashboard.snapshot().loading);

    let (_, during) = tokio::join!(dashboard.refresh(RefreshMode::Silent), async {
        sleep(Duration::from_millis(50)).await;
        dashboard.snapshot()
    });
    assert!(!during.loading);
}

#[tokio::test(start_paused = true)]
async fn test_loading_cleared_after_failed_visible_refresh() {
    let service = service_with(&[("a", "Flour")]).await;
    service.fail(Endpoint::ListItems, 502).await;
    let dashboard = dashboard(&service);

    dashboard.refresh(RefreshMode::Visible).await;
    let state = dashboard.snapshot();
    assert!(!state.loading);
    assert!(state.error.is_some());
}

#[tokio::test(start_paused = true)]
async fn test_older_cycle_never_overwrites_newer_commit() {
    let service = service_with(&[("a", "Flour")]).await;
    service
        .set_latency(Endpoint::ListItems, Duration::from_millis(200))
        .await;
    let dashboard = dashboard(&service);

    let (slow, fast) = tokio::join!(dashboard.refresh(RefreshMode::Silent), async {
        sleep(Duration::from_millis(50)).await;
        service
            .set_latency(Endpoint::ListItems, Duration::ZERO)
            .await;
        service.set_items(vec![Item::new("b", "Sugar")]).await;
        let outcome = dashboard.refresh(RefreshMode::Silent).await;
        service.set_items(vec![Item::new("c", "Salt")]).await;
        outcome
    });

    assert!(fast.is_committed());
    assert_eq!(slow, RefreshOutcome::Superseded);
    assert_eq!(names(&dashboard.snapshot().items), vec!["Sugar"]);
}

#[tokio::test(start_paused = true)]
async fn test_timer_tick_skipped_while_refresh_in_flight() {
    let service = service_with(&[("a", "Flour")]).await;
    service
        .set_latency(Endpoint::ListItems, Duration::from_millis(100))
        .await;
    let dashboard = dashboard(&service);

    let (_, tick) = tokio::join!(dashboard.refresh(RefreshMode::Visible), async {
        sleep(Duration::from_millis(10)).await;
        dashboard.refresh_on_tick().await
    });

    assert!(tick.is_none());
    assert_eq!(service.calls(Endpoint::ListItems), 1);
    assert!(!dashboard.is_refreshing());

    assert!(dashboard.refresh_on_tick().await.is_some());
    assert_eq!(service.calls(Endpoint::ListItems), 2);
}

#[tokio::test(start_paused = true)]
async fn test_hung_request_fails_cycle_at_deadline() {
    let service = service_with(&[("a", "Flour")]).await;
    service
        .set_latency(Endpoint::ListItems, Duration::from_secs(3600))
        .await;
    let dashboard = dashboard(&service).with_request_timeout(Duration::from_secs(2));

    let started = tokio::time::Instant::now();
    let outcome = dashboard.refresh(RefreshMode::Visible).await;

    assert!(started.elapsed() >= Duration::from_secs(2));
    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(
        outcome,
        RefreshOutcome::Failed("Request timed out after 2000ms".to_string())
    );
    let state = dashboard.snapshot();
    assert!(!state.loading);
    assert!(state.items.is_empty());
    assert_eq!(state.error.as_deref(), Some("Request timed out after 2000ms"));
    assert!(!dashboard.is_refreshing());
}

#[tokio::test]
async fn test_last_refreshed_is_monotonic() {
    let service = service_with(&[("a", "Flour")]).await;
    let dashboard = dashboard(&service);

    dashboard.refresh(RefreshMode::Silent).await;
    let first = dashboard.snapshot().last_refreshed.unwrap();
    dashboard.refresh(RefreshMode::Silent).await;
    let second = dashboard.snapshot().last_refreshed.unwrap();
    assert!(second >= first);
}

#[tokio::test]
async fn test_subscribers_see_committed_state() {
    let service = service_with(&[("a", "Flour")]).await;
    let dashboard = dashboard(&service);
    let mut updates = dashboard.subscribe();

    dashboard.refresh(RefreshMode::Visible).await;

    assert!(updates.has_changed().unwrap());
    let state = updates.borrow_and_update().clone();
    assert_eq!(state.items.len(), 1);
    assert!(!state.loading);
}

// ==========================================================================
// Cache
// ==========================================================================

#[tokio::test]
async fn test_cache_seeds_next_session_when_service_is_down() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("cache.db");
    let service = service_with(&[("a", "Flour"), ("b", "Sugar")]).await;

    {
        let dashboard = Dashboard::new(Arc::clone(&service), Some(CacheStore::open(&path).unwrap()));
        assert!(dashboard.refresh(RefreshMode::Visible).await.is_committed());
    }

    let cache = CacheStore::open(&path).unwrap();
    let stored_at = cache.last_refreshed();
    assert!(stored_at.is_some());

    service.fail(Endpoint::ListItems, 503).await;
    let dashboard = Dashboard::new(Arc::clone(&service), Some(cache));

    let seeded = dashboard.snapshot();
    assert_eq!(names(&seeded.items), vec!["Flour", "Sugar"]);
    assert_eq!(seeded.alerts.len(), 2);
    assert_eq!(seeded.devices.len(), 1);
    assert_eq!(seeded.selected_item_id.as_deref(), Some("a"));
    assert_eq!(seeded.last_refreshed, stored_at);

    let outcome = dashboard.refresh(RefreshMode::Visible).await;
    assert!(matches!(outcome, RefreshOutcome::Failed(_)));

    let state = dashboard.snapshot();
    assert_eq!(names(&state.items), vec!["Flour", "Sugar"]);
    assert!(state.error.as_deref().unwrap().starts_with("503 "));
}

#[tokio::test]
async fn test_failed_refresh_leaves_cache_untouched() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("cache.db");
    let service = service_with(&[("a", "Flour")]).await;

    {
        let dashboard = Dashboard::new(Arc::clone(&service), Some(CacheStore::open(&path).unwrap()));
        dashboard.refresh(RefreshMode::Silent).await;

        service.set_items(vec![Item::new("b", "Sugar")]).await;
        service.fail(Endpoint::ListDevices, 500).await;
        dashboard.refresh(RefreshMode::Silent).await;
    }

    let snapshot = CacheStore::open(&path).unwrap().load_snapshot();
    assert_eq!(names(&snapshot.items), vec!["Flour"]);
}

#[tokio::test]
async fn test_corrupt_cache_entry_degrades_to_empty() {
    let cache = CacheStore::open_in_memory().unwrap();
    cache.save_collections(&[Item::new("a", "Flour")], &[alert(1, "x")], &[]);
    cache
        .write_raw(smartinv_store::CacheKey::Items, "{not json")
        .unwrap();

    let service = Arc::new(MockInventory::new());
    let dashboard = Dashboard::new(service, Some(cache));

    let state = dashboard.snapshot();
    assert!(state.items.is_empty());
    assert!(state.selected_item_id.is_none());
    assert_eq!(state.alerts.len(), 1);
}

#[tokio::test]
async fn test_cache_write_failure_does_not_fail_refresh() {
    let cache = CacheStore::open_in_memory().unwrap();
    cache.break_storage().unwrap();
    let service = service_with(&[("a", "Flour")]).await;
    let dashboard = Dashboard::new(Arc::clone(&service), Some(cache));

    let outcome = dashboard.refresh(RefreshMode::Visible).await;
    assert!(outcome.is_committed());
    let state = dashboard.snapshot();
    assert_eq!(state.items.len(), 1);
    assert!(state.error.is_none());
}

// ==========================================================================
// Selection
// ==========================================================================

#[tokio::test]
async fn test_auto_selects_first_item_and_loads_detail() {
    let service = service_with(&[("a", "Flour"), ("b", "Sugar")]).await;
    service
        .set_history("a", vec![reading(1, "ok"), reading(2, "low")])
        .await;
    let dashboard = Dashboard::new(Arc::clone(&service), None)
        .with_history_range(HistoryRange::hours(24));

    dashboard.refresh(RefreshMode::Visible).await;

    let state = dashboard.snapshot();
    assert_eq!(state.selected_item_id.as_deref(), Some("a"));
    let detail = state.selected_item.unwrap();
    assert_eq!(detail.latest_reading.unwrap().seq_id, Some(2));
    assert_eq!(state.history.len(), 2);
    assert_eq!(
        service.last_history_range().await,
        Some(HistoryRange::hours(24))
    );
}

#[tokio::test]
async fn test_refresh_never_overrides_existing_selection() {
    let service = service_with(&[("a", "Flour"), ("b", "Sugar")]).await;
    let dashboard = dashboard(&service);
    dashboard.refresh(RefreshMode::Visible).await;

    assert!(dashboard.select_and_fetch(Some("b")).await.is_some());

    service
        .set_items(vec![Item::new("c", "Salt"), Item::new("b", "Sugar")])
        .await;
    let outcome = dashboard.refresh(RefreshMode::Silent).await;
    assert_eq!(
        outcome,
        RefreshOutcome::Committed {
            auto_selected: None
        }
    );
    assert_eq!(dashboard.snapshot().selected_item_id.as_deref(), Some("b"));

    // Still kept when the item disappears from the list.
    service.set_items(vec![Item::new("c", "Salt")]).await;
    dashboard.refresh(RefreshMode::Silent).await;
    let state = dashboard.snapshot();
    assert_eq!(state.selected_item_id.as_deref(), Some("b"));
    assert!(state.selected_list_item().is_none());
}

#[tokio::test]
async fn test_select_unknown_item_is_ignored() {
    let service = service_with(&[("a", "Flour")]).await;
    let dashboard = dashboard(&service);
    dashboard.refresh(RefreshMode::Visible).await;

    assert!(dashboard.select(Some("missing")).is_none());
    assert_eq!(dashboard.snapshot().selected_item_id.as_deref(), Some("a"));
}

#[tokio::test]
async fn test_clearing_selection_clears_detail() {
    let service = service_with(&[("a", "Flour")]).await;
    service.set_history("a", vec![reading(1, "ok")]).await;
    let dashboard = dashboard(&service);
    dashboard.refresh(RefreshMode::Visible).await;
    assert!(dashboard.snapshot().selected_item.is_some());

    let detail_calls = service.calls(Endpoint::GetItem);
    assert_eq!(
        dashboard.select_and_fetch(None).await,
        Some(DetailOutcome::Cleared)
    );

    let state = dashboard.snapshot();
    assert!(state.selected_item_id.is_none());
    assert!(state.selected_item.is_none());
    assert!(state.history.is_empty());
    assert_eq!(service.calls(Endpoint::GetItem), detail_calls);
}

#[tokio::test(start_paused = true)]
async fn test_stale_detail_response_is_discarded() {
    let service = service_with(&[("x", "Slow item"), ("y", "Fast item")]).await;
    service.set_history("x", vec![reading(1, "ok")]).await;
    service
        .set_history("y", vec![reading(5, "low"), reading(6, "out")])
        .await;
    let dashboard = dashboard(&service);
    dashboard.refresh(RefreshMode::Silent).await;

    service
        .set_item_latency("x", Duration::from_millis(500))
        .await;

    let (slow, fast) = tokio::join!(dashboard.select_and_fetch(Some("x")), async {
        sleep(Duration::from_millis(50)).await;
        dashboard.select_and_fetch(Some("y")).await
    });

    assert_eq!(fast, Some(DetailOutcome::Applied));
    assert_eq!(slow, Some(DetailOutcome::Superseded));

    let state = dashboard.snapshot();
    assert_eq!(state.selected_item_id.as_deref(), Some("y"));
    assert_eq!(state.selected_item.unwrap().id, "y");
    assert_eq!(state.history.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_stale_detail_failure_is_ignored() {
    let service = service_with(&[("x", "Slow item"), ("y", "Fast item")]).await;
    service.set_history("y", vec![reading(5, "low")]).await;
    let dashboard = dashboard(&service);
    dashboard.refresh(RefreshMode::Silent).await;

    service
        .set_item_latency("x", Duration::from_millis(500))
        .await;

    let (slow, fast) = tokio::join!(dashboard.select_and_fetch(Some("x")), async {
        sleep(Duration::from_millis(50)).await;
        let outcome = dashboard.select_and_fetch(Some("y")).await;
        // x's history request is still sleeping and will fail when it wakes.
        service.fail(Endpoint::ItemHistory, 500).await;
        outcome
    });

    assert_eq!(fast, Some(DetailOutcome::Applied));
    assert_eq!(slow, Some(DetailOutcome::Superseded));

    let state = dashboard.snapshot();
    assert!(state.error.is_none());
    assert_eq!(state.selected_item_id.as_deref(), Some("y"));
    assert_eq!(state.selected_item.unwrap().id, "y");
    assert_eq!(state.history, vec![reading(5, "low")]);
}

#[tokio::test(start_paused = true)]
async fn test_detail_fetch_times_out() {
    let service = service_with(&[("a", "Flour"), ("b", "Sugar")]).await;
    let dashboard = dashboard(&service);
    dashboard.refresh(RefreshMode::Visible).await;

    service
        .set_item_latency("b", Duration::from_secs(3600))
        .await;
    let outcome = dashboard.select_and_fetch(Some("b")).await;

    assert_eq!(
        outcome,
        Some(DetailOutcome::Failed(
            "Request timed out after 10000ms".to_string()
        ))
    );
    let state = dashboard.snapshot();
    assert_eq!(state.selected_item.unwrap().id, "a");
    assert!(state.error.is_some());
}

#[tokio::test]
async fn test_detail_failure_keeps_previous_detail() {
    let service = service_with(&[("a", "Flour"), ("b", "Sugar")]).await;
    let dashboard = dashboard(&service);
    dashboard.refresh(RefreshMode::Visible).await;
    assert_eq!(dashboard.snapshot().selected_item.unwrap().id, "a");

    service.fail(Endpoint::ItemHistory, 500).await;
    let outcome = dashboard.select_and_fetch(Some("b")).await;
    assert!(matches!(outcome, Some(DetailOutcome::Failed(_))));

    let state = dashboard.snapshot();
    assert_eq!(state.selected_item_id.as_deref(), Some("b"));
    assert_eq!(state.selected_item.unwrap().id, "a");
    assert_eq!(
        state.error.as_deref(),
        Some("500 Internal Server Error: Mock failure")
    );

    service.recover_all().await;
    assert_eq!(
        dashboard.select_and_fetch(Some("b")).await,
        Some(DetailOutcome::Applied)
    );
    assert!(dashboard.snapshot().error.is_none());
}

// ==========================================================================
// Acknowledge
// ==========================================================================

#[tokio::test(start_paused = true)]
async fn test_acknowledged_alert_stays_until_refresh_commits() {
    let service = service_with(&[("a", "Flour")]).await;
    let dashboard = dashboard(&service);
    dashboard.refresh(RefreshMode::Visible).await;

    service
        .set_latency(Endpoint::ActiveAlerts, Duration::from_millis(200))
        .await;

    let (result, during) = tokio::join!(dashboard.acknowledge(1), async {
        sleep(Duration::from_millis(100)).await;
        dashboard.snapshot()
    });

    assert!(result.unwrap().is_committed());
    assert_eq!(during.alerts.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(
        dashboard
            .snapshot()
            .alerts
            .iter()
            .map(|a| a.id)
            .collect::<Vec<_>>(),
        vec![2]
    );
    assert_eq!(service.active_alert_ids().await, vec![2]);
}

#[tokio::test]
async fn test_failed_acknowledge_surfaces_error_without_refresh() {
    let service = service_with(&[("a", "Flour")]).await;
    let dashboard = dashboard(&service);
    dashboard.refresh(RefreshMode::Visible).await;
    let refreshes = service.calls(Endpoint::ListItems);

    let err = dashboard.acknowledge(99).await.unwrap_err();
    assert_eq!(err.status(), Some(404));

    let state = dashboard.snapshot();
    assert_eq!(
        state.error.as_deref(),
        Some(r#"404 Not Found: {"detail":"Alert not found"}"#)
    );
    assert_eq!(state.alerts.len(), 2);
    assert_eq!(service.calls(Endpoint::ListItems), refreshes);
}

// ==========================================================================
// Poller
// ==========================================================================

#[tokio::test(start_paused = true)]
async fn test_poller_refreshes_on_start_and_each_tick() {
    let service = service_with(&[("a", "Flour")]).await;
    let dashboard = Arc::new(dashboard(&service));

    let poller = Poller::start(Arc::clone(&dashboard), Duration::from_secs(1));
    sleep(Duration::from_millis(10)).await;
    assert_eq!(service.calls(Endpoint::ListItems), 1);
    assert!(poller.is_running());

    sleep(Duration::from_millis(1000)).await;
    assert_eq!(service.calls(Endpoint::ListItems), 2);

    sleep(Duration::from_millis(2000)).await;
    assert_eq!(service.calls(Endpoint::ListItems), 4);

    poller.shutdown().await;
    sleep(Duration::from_secs(5)).await;
    assert_eq!(service.calls(Endpoint::ListItems), 4);
}

#[tokio::test(start_paused = true)]
async fn test_hung_request_does_not_stall_polling() {
    let service = service_with(&[("a", "Flour")]).await;
    service
        .set_latency(Endpoint::ListItems, Duration::from_secs(3600))
        .await;
    let dashboard = Arc::new(dashboard(&service));

    let poller = dashboard.start(Duration::from_secs(1));
    sleep(Duration::from_millis(10)).await;
    service
        .set_latency(Endpoint::ListItems, Duration::ZERO)
        .await;

    // Ticks during the hung initial cycle are skipped.
    sleep(Duration::from_secs(5)).await;
    assert_eq!(service.calls(Endpoint::ListItems), 1);
    assert!(dashboard.snapshot().loading);

    sleep(Duration::from_secs(55)).await;
    assert!(service.calls(Endpoint::ListItems) > 1);

    let state = dashboard.snapshot();
    assert!(!state.loading);
    assert_eq!(names(&state.items), vec!["Flour"]);
    assert!(state.error.is_none());
    assert_eq!(state.selected_item.unwrap().id, "a");

    poller.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_dropping_poller_stops_ticks() {
    let service = service_with(&[("a", "Flour")]).await;
    let dashboard = Arc::new(dashboard(&service));

    let poller = Poller::start(Arc::clone(&dashboard), Duration::from_secs(1));
    sleep(Duration::from_millis(10)).await;
    drop(poller);

    sleep(Duration::from_secs(5)).await;
    assert_eq!(service.calls(Endpoint::ListItems), 1);
}

#[tokio::test(start_paused = true)]
async fn test_poller_fetches_detail_for_cached_selection() {
    let cache = CacheStore::open_in_memory().unwrap();
    cache.save_collections(&[Item::new("b", "Sugar")], &[], &[]);
    let service = service_with(&[("a", "Flour"), ("b", "Sugar")]).await;
    let dashboard = Arc::new(Dashboard::new(Arc::clone(&service), Some(cache)));
    assert_eq!(dashboard.snapshot().selected_item_id.as_deref(), Some("b"));

    let poller = Poller::start(Arc::clone(&dashboard), Duration::from_secs(15));
    sleep(Duration::from_millis(10)).await;

    let state = dashboard.snapshot();
    assert_eq!(state.selected_item_id.as_deref(), Some("b"));
    assert_eq!(state.selected_item.unwrap().id, "b");
    assert_eq!(names(&state.items), vec!["Flour", "Sugar"]);
    assert_eq!(service.calls(Endpoint::GetItem), 1);

    poller.shutdown().await;
}

// ==========================================================================
// Item search
// ==========================================================================

#[tokio::test]
async fn test_search_filters_refreshed_items() {
    let service = service_with(&[
        ("1", "Temperature Sensor"),
        ("2", "Coffee beans"),
        ("3", "Spare sensor cable"),
        ("4", "Dish soap"),
    ])
    .await;
    let dashboard = dashboard(&service);
    dashboard.refresh(RefreshMode::Visible).await;
    let state = dashboard.snapshot();

    let view = ItemListView::new(&state.items, "sensor", state.selected_item_id.as_deref());
    assert_eq!(view.rows.len(), 2);
    assert!(!view.show_empty_state());
    assert!(view.is_selected(view.rows[0]));

    let view = ItemListView::new(&state.items, "nonexistent", None);
    assert_eq!(view.rows.len(), 0);
    assert!(view.show_empty_state());

    let view = ItemListView::new(&state.items, "", None);
    assert_eq!(view.rows.len(), 4);
}
