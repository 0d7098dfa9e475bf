//! Background task keeping a caller's position report current.
//!
//! The ledger is read once at start and again on every [`PositionWatcher::refresh`]
//! (call it after any write that may have changed pools or deposits). Between
//! reads the cached snapshot is re-classified on each tick so countdowns move.

use crate::ledger::{Address, Ledger};
use crate::positions::PositionReport;
use crate::reconciler::{unix_now, Reconciler};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub struct PositionWatcher {
    reports: watch::Receiver<Option<PositionReport>>,
    refresh: Arc<Notify>,
    task: JoinHandle<()>,
}

impl PositionWatcher {
    pub fn spawn<L>(reconciler: Reconciler<L>, caller: Address, tick: Duration) -> Self
    where
        L: Ledger + 'static,
    {
        let (tx, reports) = watch::channel(None);
        let refresh = Arc::new(Notify::new());
        let refresh_rx = Arc::clone(&refresh);

        let task = tokio::spawn(async move {
            let decimals = reconciler.decimals();
            let mut snapshot = reconciler.snapshot(&caller).await;
            tracing::info!(
                "Watching {} pools for {caller}",
                snapshot.pools.len()
            );
            tx.send_replace(Some(snapshot.report(unix_now(), decimals)));

            let mut ticker = tokio::time::interval(tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = refresh_rx.notified() => {
                        tracing::debug!("Refreshing ledger snapshot for {caller}");
                        snapshot = reconciler.snapshot(&caller).await;
                    }
                }

                if tx.send(Some(snapshot.report(unix_now(), decimals))).is_err() {
                    break;
                }
            }
        });

        Self {
            reports,
            refresh,
            task,
        }
    }

    /// Re-read the ledger before the next report.
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<PositionReport>> {
        self.reports.clone()
    }

    pub fn latest(&self) -> Option<PositionReport> {
        self.reports.borrow().clone()
    }

    /// Wait for the next report. `None` once the task has stopped.
    pub async fn next(&mut self) -> Option<PositionReport> {
        self.reports.changed().await.ok()?;
        self.reports.borrow_and_update().clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the task. In-flight ledger reads are abandoned.
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for PositionWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}
