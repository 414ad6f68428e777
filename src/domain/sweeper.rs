//! Background task evicting expired rate-limit buckets.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use super::rate_limiter::RateLimiter;

/// Handle to a running sweeper. Dropping it without calling
/// [`SweeperHandle::shutdown`] also stops the task, without waiting for it.
pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the sweeper to stop and waits for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let _ = self.task.await;
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Spawns a task that calls [`RateLimiter::sweep`] every `every`.
///
/// The first sweep happens immediately. The task exits when the handle is
/// shut down or dropped.
pub fn spawn_sweeper(limiter: Arc<RateLimiter>, every: Duration) -> SweeperHandle {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let removed = limiter.sweep();
                    if removed > 0 {
                        debug!(
                            removed,
                            remaining = limiter.tracked_clients(),
                            "Swept expired rate-limit buckets"
                        );
                    }
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Rate-limit sweeper stopped");
    });

    SweeperHandle { shutdown_tx, task }
}
