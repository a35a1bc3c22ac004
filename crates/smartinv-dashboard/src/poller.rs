//! Background refresh timer.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use smartinv_core::InventoryApi;

use crate::dashboard::{Dashboard, RefreshMode};

/// Drives a [`Dashboard`] while it is mounted.
///
/// On start it runs one visible refresh alongside the detail fetch for the
/// current (cache-seeded) selection. The timer starts at the same time and
/// fires a silent refresh every `period`; ticks that land while another
/// cycle is in flight, the initial one included, are skipped. Each cycle is
/// bounded by the dashboard's request timeout, so a hung request delays
/// only its own cycle. Dropping the poller cancels it;
/// [`shutdown`](Self::shutdown) also waits for the task to finish.
#[derive(Debug)]
pub struct Poller {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    pub fn start<A>(dashboard: Arc<Dashboard<A>>, period: Duration) -> Self
    where
        A: InventoryApi + 'static,
    {
        let period = period.max(Duration::from_millis(1));
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(dashboard, period, cancel.clone()));

        info!(interval_ms = period.as_millis() as u64, "Poller started");
        Self {
            cancel,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stop polling and wait for the task to exit.
    ///
    /// An in-flight cycle is abandoned wherever it is. If it had already
    /// committed, the new state stays published but its cache write may not
    /// have happened.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take()
            && let Err(e) = handle.await
            && e.is_panic()
        {
            warn!("Poller task panicked: {}", e);
        }
        info!("Poller stopped");
    }
}

impl<A: InventoryApi + 'static> Dashboard<A> {
    /// Start a [`Poller`] for this dashboard.
    pub fn start(self: &Arc<Self>, interval: Duration) -> Poller {
        Poller::start(Arc::clone(self), interval)
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run<A: InventoryApi + 'static>(
    dashboard: Arc<Dashboard<A>>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let initial = tokio::spawn(initial_cycle(Arc::clone(&dashboard), cancel.clone()));

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            outcome = dashboard.refresh_on_tick() => {
                if let Some(outcome) = outcome {
                    debug!(?outcome, "Timer refresh finished");
                }
            }
        }
    }

    if let Err(e) = initial.await
        && e.is_panic()
    {
        warn!("Initial refresh panicked: {}", e);
    }
}

/// Visible refresh plus the detail fetch for the seeded selection.
async fn initial_cycle<A: InventoryApi>(
    dashboard: Arc<Dashboard<A>>,
    cancel: CancellationToken,
) {
    let selection = dashboard.current_selection();
    tokio::select! {
        _ = cancel.cancelled() => {}
        (outcome, detail) = async {
            tokio::join!(
                dashboard.refresh(RefreshMode::Visible),
                dashboard.fetch_selection(selection)
            )
        } => {
            debug!(?outcome, ?detail, "Initial refresh finished");
        }
    }
}
