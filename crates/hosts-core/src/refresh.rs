//! Delayed one-shot startup refresh task.
//!
//! The process runs exactly one background task: a thread that sleeps
//! briefly after startup, then reconciles every startup-frequency remote
//! source through the service. The delay keeps the refresh from competing
//! with whatever the embedding application does first.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::service::HostsService;

/// How long the startup task waits before its refresh pass.
pub const STARTUP_REFRESH_DELAY: Duration = Duration::from_secs(3);

/// Granularity of the cancellable sleep. Shutdown waits at most this long
/// for a task that has not started its refresh pass yet.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Handle to the spawned startup task.
///
/// Dropping the handle detaches the thread; call [`RefreshHandle::shutdown`]
/// to cancel a pending refresh and wait for the thread to finish.
pub struct RefreshHandle {
    cancel: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl RefreshHandle {
    /// Cancel the task if it is still sleeping and wait for the thread.
    ///
    /// A refresh pass that already started runs to completion; only the
    /// sleep is interruptible.
    pub fn shutdown(self) {
        self.cancel.store(true, Ordering::Relaxed);
        if self.thread.join().is_err() {
            warn!("startup refresh thread panicked");
        }
    }
}

/// Spawn the startup refresh: sleep for `delay`, then run one refresh pass
/// over the service's startup-frequency sources.
pub fn spawn_startup_refresh(service: Arc<HostsService>, delay: Duration) -> RefreshHandle {
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_flag = Arc::clone(&cancel);

    let thread = std::thread::spawn(move || {
        debug!(?delay, "startup refresh scheduled");
        if !sleep_unless_cancelled(delay, &cancel_flag) {
            debug!("startup refresh cancelled before running");
            return;
        }

        let summary = service.run_startup_refresh();
        if summary.failed.is_empty() {
            info!(updated = summary.updated.len(), "startup refresh finished");
        } else {
            warn!(
                updated = summary.updated.len(),
                failed = ?summary.failed,
                "startup refresh finished with failures"
            );
        }
    });

    RefreshHandle { cancel, thread }
}

/// Sleep in short slices so a shutdown request interrupts the wait.
/// Returns `false` when cancelled.
fn sleep_unless_cancelled(total: Duration, cancel: &AtomicBool) -> bool {
    let mut remaining = total;
    while !remaining.is_zero() {
        if cancel.load(Ordering::Relaxed) {
            return false;
        }
        let slice = remaining.min(CANCEL_POLL_INTERVAL);
        std::thread::sleep(slice);
        remaining = remaining.saturating_sub(slice);
    }
    !cancel.load(Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn sleep_completes_when_not_cancelled() {
        let cancel = AtomicBool::new(false);
        assert!(sleep_unless_cancelled(Duration::from_millis(10), &cancel));
    }

    #[test]
    fn cancelled_sleep_returns_early() {
        let cancel = AtomicBool::new(true);
        let start = Instant::now();
        assert!(!sleep_unless_cancelled(Duration::from_secs(30), &cancel));
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
