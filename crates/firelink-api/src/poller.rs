// ── Background polling task lifecycle ──
//
// Both backends own one of these. Start/stop are idempotent; stop waits
// for the loop to actually exit so a handoff never races a stale poller.

use std::future::Future;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct PollTask {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

pub(crate) struct Poller {
    task: tokio::sync::Mutex<Option<PollTask>>,
}

impl Poller {
    pub(crate) fn new() -> Self {
        Self {
            task: tokio::sync::Mutex::new(None),
        }
    }

    /// Spawn the polling loop if it isn't running. Returns `true` if a
    /// new task was spawned, `false` if one was already active.
    pub(crate) async fn start<F, Fut>(&self, make_loop: F) -> bool
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut guard = self.task.lock().await;
        if let Some(task) = guard.as_ref() {
            if !task.handle.is_finished() {
                return false;
            }
        }
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(make_loop(cancel.clone()));
        *guard = Some(PollTask { cancel, handle });
        true
    }

    /// Cancel the polling loop and wait for it to finish. Returns `true`
    /// if a task was actually stopped.
    pub(crate) async fn stop(&self) -> bool {
        let task = self.task.lock().await.take();
        let Some(task) = task else {
            return false;
        };
        task.cancel.cancel();
        let _ = task.handle.await;
        true
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        // Dropping the owning backend must not leak the loop. Cannot
        // await the handle here; cancellation is enough.
        if let Some(task) = self.task.get_mut().take() {
            task.cancel.cancel();
        }
    }
}
