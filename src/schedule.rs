//! Fixed-interval background polling with an explicit stop handle.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(300);

/// Handle to a running poller. Dropping it stops the poller.
pub struct PollHandle {
    name: &'static str,
    cancel: CancellationToken,
    wake: Arc<Notify>,
    task: JoinHandle<()>,
}

impl PollHandle {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Run the job now instead of waiting for the next tick
    pub fn trigger(&self) {
        self.wake.notify_one();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the task to exit, usually after [`stop`](Self::stop)
    pub async fn wait(&mut self) {
        if let Err(e) = (&mut self.task).await {
            tracing::warn!(poller = self.name, "poller task ended abnormally: {}", e);
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Run `job` once right away and then every `every`, sending each result to `tx`.
///
/// Runs never overlap: the next tick is only awaited once the previous job
/// has finished. The poller exits when stopped or when the receiver is gone.
/// `every` must be non-zero.
pub fn spawn_poller<T, F, Fut>(
    name: &'static str,
    every: Duration,
    mut job: F,
    tx: mpsc::UnboundedSender<T>,
) -> PollHandle
where
    T: Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = T> + Send + 'static,
{
    let cancel = CancellationToken::new();
    let wake = Arc::new(Notify::new());

    let task = tokio::spawn({
        let cancel = cancel.clone();
        let wake = wake.clone();
        async move {
            let mut ticker = interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                let woken = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => false,
                    _ = wake.notified() => true,
                };
                if woken {
                    ticker.reset();
                }

                tracing::debug!(poller = name, "refreshing");
                let result = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    result = job() => result,
                };

                if tx.send(result).is_err() {
                    break;
                }
            }

            tracing::debug!(poller = name, "poller stopped");
        }
    });

    PollHandle {
        name,
        cancel,
        wake,
        task,
    }
}
