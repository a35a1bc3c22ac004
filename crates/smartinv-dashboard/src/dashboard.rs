//! Dashboard controller.
//!
//! [`Dashboard`] owns the [`DashboardState`] and is the only thing that
//! mutates it. Renderers read snapshots or subscribe to a
//! [`watch::Receiver`]; every operation publishes at most one consistent
//! state per step.
//!
//! # Concurrency
//!
//! Refresh cycles are numbered. A cycle commits only if no newer cycle has
//! committed yet, so a slow cycle can never roll the collections back.
//! Selection changes bump a generation counter, and detail responses are
//! applied only if the generation they were requested under is still
//! current.
//!
//! Every fetch group runs under a deadline
//! ([`with_request_timeout`](Dashboard::with_request_timeout)). A request
//! that never answers fails its cycle instead of holding it open.

use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use time::OffsetDateTime;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use smartinv_core::{Error, InventoryApi};
use smartinv_store::{CacheStore, CachedSnapshot};
use smartinv_types::{Alert, AlertId, Device, HistoryRange, Item};

use crate::state::DashboardState;

/// Deadline for one fetch group unless configured otherwise.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How a refresh cycle is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Sets the loading flag for the duration of the cycle.
    Visible,
    /// Runs without touching the loading flag.
    Silent,
}

/// Result of a refresh cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// All three collections were replaced.
    Committed {
        /// Item selected because nothing was selected before.
        auto_selected: Option<String>,
    },
    /// A fetch failed; collections were left untouched.
    Failed(String),
    /// A newer cycle committed first; this one was discarded.
    Superseded,
}

impl RefreshOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// Result of a detail fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    /// Detail and history were replaced.
    Applied,
    /// The selection moved on; the response was dropped.
    Superseded,
    /// Nothing is selected.
    Cleared,
    /// The fetch failed while the selection was still current.
    Failed(String),
}

/// Identifies one selection request.
///
/// Obtained from [`Dashboard::select`] or [`Dashboard::current_selection`]
/// and passed to [`Dashboard::fetch_selection`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "the selected item's detail is only loaded by `fetch_selection`"]
pub struct SelectionTicket {
    generation: u64,
    item_id: Option<String>,
}

impl SelectionTicket {
    pub fn item_id(&self) -> Option<&str> {
        self.item_id.as_deref()
    }
}

/// Cache handle plus the newest cycle written through it.
struct CacheSlot {
    store: CacheStore,
    persisted_cycle: u64,
}

/// Counts in-flight refresh cycles while alive.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }

    /// Enter only if nothing else is in flight.
    fn enter_idle(counter: &'a AtomicUsize) -> Option<Self> {
        counter
            .compare_exchange(0, 1, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| Self(counter))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// State-sync engine for the inventory dashboard.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use smartinv_core::MockInventory;
/// use smartinv_dashboard::{Dashboard, RefreshMode};
/// use smartinv_types::Item;
///
/// #[tokio::main]
/// async fn main() {
///     let service = Arc::new(MockInventory::new());
///     service.set_items(vec![Item::new("a", "Flour")]).await;
///
///     let dashboard = Dashboard::new(Arc::clone(&service), None);
///     dashboard.refresh(RefreshMode::Visible).await;
///
///     let state = dashboard.snapshot();
///     assert_eq!(state.items.len(), 1);
///     assert_eq!(state.selected_item_id.as_deref(), Some("a"));
/// }
/// ```
pub struct Dashboard<A> {
    api: A,
    cache: Option<Mutex<CacheSlot>>,
    state: watch::Sender<DashboardState>,
    history_range: HistoryRange,
    request_timeout: Duration,
    /// Bumped on every selection change.
    selection: AtomicU64,
    /// Last cycle number handed out.
    next_cycle: AtomicU64,
    /// Newest cycle whose collections are in `state`.
    committed_cycle: AtomicU64,
    in_flight: AtomicUsize,
}

impl<A: InventoryApi> Dashboard<A> {
    /// Create a dashboard, seeding state from `cache` when given.
    ///
    /// The first cached item, if any, becomes the selection.
    pub fn new(api: A, cache: Option<CacheStore>) -> Self {
        let initial = match &cache {
            Some(store) => {
                let snapshot = store.load_snapshot();
                if !snapshot.is_empty() {
                    info!(
                        items = snapshot.items.len(),
                        alerts = snapshot.alerts.len(),
                        devices = snapshot.devices.len(),
                        "Seeded dashboard from cache"
                    );
                }
                DashboardState::from_cache(snapshot)
            }
            None => DashboardState::default(),
        };
        let (state, _) = watch::channel(initial);

        Self {
            api,
            cache: cache.map(|store| {
                Mutex::new(CacheSlot {
                    store,
                    persisted_cycle: 0,
                })
            }),
            state,
            history_range: HistoryRange::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            selection: AtomicU64::new(0),
            next_cycle: AtomicU64::new(0),
            committed_cycle: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Set the window used for history fetches.
    pub fn with_history_range(mut self, range: HistoryRange) -> Self {
        self.history_range = range;
        self
    }

    /// Set the deadline for each group of concurrent requests.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn history_range(&self) -> HistoryRange {
        self.history_range
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    /// Receive every published state.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    /// Whether any refresh cycle is running.
    pub fn is_refreshing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    // ======================================================================
    // Refresh
    // ======================================================================

    /// Run one refresh cycle.
    ///
    /// Items, active alerts and devices are fetched concurrently and
    /// committed together, or not at all. On success they are written to
    /// the cache. If the cycle selects the first item, its detail is fetched
    /// before this returns.
    pub async fn refresh(&self, mode: RefreshMode) -> RefreshOutcome {
        let _flight = InFlight::enter(&self.in_flight);
        self.run_refresh(mode).await
    }

    /// Silent refresh for a timer tick.
    ///
    /// Returns `None` without fetching anything while another cycle is in
    /// flight.
    pub async fn refresh_on_tick(&self) -> Option<RefreshOutcome> {
        let Some(_flight) = InFlight::enter_idle(&self.in_flight) else {
            debug!("Skipping timer refresh, a cycle is already in flight");
            return None;
        };
        Some(self.run_refresh(RefreshMode::Silent).await)
    }

    async fn run_refresh(&self, mode: RefreshMode) -> RefreshOutcome {
        let cycle = self.next_cycle.fetch_add(1, Ordering::SeqCst) + 1;
        let visible = mode == RefreshMode::Visible;
        debug!(cycle, ?mode, "Refresh started");
        self.state.send_modify(|state| state.begin_refresh(visible));

        let fetched = self
            .with_deadline(async {
                tokio::try_join!(
                    self.api.list_items(),
                    self.api.active_alerts(),
                    self.api.list_devices()
                )
            })
            .await;

        let (outcome, auto_selected) = match fetched {
            Ok((items, alerts, devices)) => self.commit(cycle, items, alerts, devices).await,
            Err(e) => {
                warn!(cycle, error = %e, "Refresh failed");
                let message = e.to_string();
                self.state.send_modify(|state| state.fail(message.clone()));
                (RefreshOutcome::Failed(message), None)
            }
        };

        if visible {
            self.state.send_modify(|state| state.end_refresh(true));
        }

        if let Some(ticket) = auto_selected {
            self.fetch_selection(ticket).await;
        }
        outcome
    }

    async fn commit(
        &self,
        cycle: u64,
        items: Vec<Item>,
        alerts: Vec<Alert>,
        devices: Vec<Device>,
    ) -> (RefreshOutcome, Option<SelectionTicket>) {
        let now = OffsetDateTime::now_utc();
        let mut committed = None;

        self.state.send_if_modified(|state| {
            if cycle < self.committed_cycle.load(Ordering::SeqCst) {
                return false;
            }
            self.committed_cycle.store(cycle, Ordering::SeqCst);

            let ticket = state
                .commit_refresh(items, alerts, devices, now)
                .map(|item_id| SelectionTicket {
                    generation: self.selection.fetch_add(1, Ordering::SeqCst) + 1,
                    item_id: Some(item_id),
                });
            let snapshot = CachedSnapshot {
                items: state.items.clone(),
                alerts: state.alerts.clone(),
                devices: state.devices.clone(),
                last_refreshed: state.last_refreshed,
            };
            committed = Some((ticket, snapshot));
            true
        });

        let Some((ticket, snapshot)) = committed else {
            debug!(cycle, "Discarding refresh superseded by a newer cycle");
            return (RefreshOutcome::Superseded, None);
        };

        debug!(
            cycle,
            items = snapshot.items.len(),
            alerts = snapshot.alerts.len(),
            devices = snapshot.devices.len(),
            "Refresh committed"
        );
        self.persist(cycle, &snapshot).await;

        let auto_selected = ticket.as_ref().and_then(|t| t.item_id.clone());
        (RefreshOutcome::Committed { auto_selected }, ticket)
    }

    /// Write a committed snapshot through to the cache.
    async fn persist(&self, cycle: u64, snapshot: &CachedSnapshot) {
        let Some(cache) = &self.cache else {
            return;
        };
        let mut slot = cache.lock().await;
        if cycle < slot.persisted_cycle {
            return;
        }
        slot.persisted_cycle = cycle;
        slot.store
            .save_collections(&snapshot.items, &snapshot.alerts, &snapshot.devices);
        if let Some(at) = snapshot.last_refreshed {
            slot.store.save_last_refreshed(at);
        }
    }

    /// Run `fetch`, failing with [`Error::Timeout`] once the request
    /// timeout elapses. The unfinished requests are dropped.
    async fn with_deadline<T>(
        &self,
        fetch: impl Future<Output = Result<T, Error>>,
    ) -> Result<T, Error> {
        tokio::time::timeout(self.request_timeout, fetch)
            .await
            .unwrap_or_else(|_| Err(Error::Timeout(self.request_timeout)))
    }

    // ======================================================================
    // Selection
    // ======================================================================

    /// Change the selected item.
    ///
    /// Returns `None` and leaves the selection alone if `item_id` is not in
    /// the current item list. `select(None)` clears the selection along with
    /// its detail and history. The new item's detail is not loaded until the
    /// ticket is passed to [`fetch_selection`](Self::fetch_selection); use
    /// [`select_and_fetch`](Self::select_and_fetch) to do both.
    #[must_use = "pass the ticket to `fetch_selection` to load the detail"]
    pub fn select(&self, item_id: Option<&str>) -> Option<SelectionTicket> {
        let mut ticket = None;

        self.state.send_if_modified(|state| {
            if let Some(id) = item_id
                && !state.contains_item(id)
            {
                return false;
            }
            let generation = self.selection.fetch_add(1, Ordering::SeqCst) + 1;
            let item_id = item_id.map(String::from);
            state.select(item_id.clone());
            ticket = Some(SelectionTicket {
                generation,
                item_id,
            });
            true
        });

        if ticket.is_none() {
            warn!(?item_id, "Ignoring selection of unknown item");
        }
        ticket
    }

    /// Ticket for whatever is selected right now.
    pub fn current_selection(&self) -> SelectionTicket {
        let state = self.state.borrow();
        SelectionTicket {
            generation: self.selection.load(Ordering::SeqCst),
            item_id: state.selected_item_id.clone(),
        }
    }

    /// Fetch detail and history for a selection.
    ///
    /// Both requests run concurrently. The result is applied only if no
    /// other selection happened in the meantime; a failure for a stale
    /// selection is dropped as well.
    pub async fn fetch_selection(&self, ticket: SelectionTicket) -> DetailOutcome {
        let Some(item_id) = ticket.item_id.as_deref() else {
            return DetailOutcome::Cleared;
        };
        debug!(item_id, generation = ticket.generation, "Fetching item detail");

        let fetched = self
            .with_deadline(async {
                tokio::try_join!(
                    self.api.get_item(item_id),
                    self.api.item_history(item_id, self.history_range)
                )
            })
            .await;

        match fetched {
            Ok((item, history)) => {
                let applied = self.state.send_if_modified(|state| {
                    if !self.is_current(&ticket) {
                        return false;
                    }
                    state.apply_detail(item, history);
                    true
                });
                if applied {
                    DetailOutcome::Applied
                } else {
                    debug!(item_id, "Discarding detail for a superseded selection");
                    DetailOutcome::Superseded
                }
            }
            Err(e) => {
                let message = e.to_string();
                let surfaced = self.state.send_if_modified(|state| {
                    if !self.is_current(&ticket) {
                        return false;
                    }
                    state.fail(message.clone());
                    true
                });
                if surfaced {
                    warn!(item_id, error = %e, "Item detail fetch failed");
                    DetailOutcome::Failed(message)
                } else {
                    debug!(item_id, error = %e, "Ignoring failure for a superseded selection");
                    DetailOutcome::Superseded
                }
            }
        }
    }

    /// [`select`](Self::select) followed by
    /// [`fetch_selection`](Self::fetch_selection).
    pub async fn select_and_fetch(&self, item_id: Option<&str>) -> Option<DetailOutcome> {
        let ticket = self.select(item_id)?;
        Some(self.fetch_selection(ticket).await)
    }

    fn is_current(&self, ticket: &SelectionTicket) -> bool {
        self.selection.load(Ordering::SeqCst) == ticket.generation
    }

    // ======================================================================
    // Actions
    // ======================================================================

    /// Acknowledge an alert, then run a silent refresh.
    ///
    /// The alert stays in the list until that refresh commits. On failure
    /// the error is surfaced and no refresh runs.
    pub async fn acknowledge(&self, alert_id: AlertId) -> Result<RefreshOutcome, Error> {
        info!(alert_id, "Acknowledging alert");

        if let Err(e) = self
            .with_deadline(self.api.acknowledge_alert(alert_id))
            .await
        {
            warn!(alert_id, error = %e, "Acknowledge failed");
            let message = e.to_string();
            self.state.send_modify(|state| state.fail(message));
            return Err(e);
        }

        Ok(self.refresh(RefreshMode::Silent).await)
    }
}

impl<A> std::fmt::Debug for Dashboard<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("history_range", &self.history_range)
            .field("request_timeout", &self.request_timeout)
            .field("cached", &self.cache.is_some())
            .field("in_flight", &self.in_flight.load(Ordering::SeqCst))
            .finish()
    }
}
