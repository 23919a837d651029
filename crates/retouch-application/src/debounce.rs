//! Trailing-edge debounce with explicit cancellation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Coalesces rapid calls into a single deferred run of `operation`.
///
/// Each [`Debouncer::call`] restarts the quiet period; the operation runs once,
/// `delay` after the last call. Nothing is queued and runs never overlap with
/// a still-pending timer. The operation's return value is discarded, and a
/// panic inside it surfaces in the spawned task, not at the call site.
///
/// Timers are spawned on the ambient tokio runtime.
pub struct Debouncer {
    delay: Duration,
    operation: Arc<dyn Fn() + Send + Sync>,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    pub fn new<F>(delay: Duration, operation: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            delay,
            operation: Arc::new(operation),
            pending: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedules the operation, replacing any pending schedule.
    ///
    /// Outside a tokio runtime there is no timer to defer to, so the operation
    /// runs immediately.
    pub fn call(&self) {
        let mut pending = self.lock_pending();
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("[Debouncer] No tokio runtime, running operation immediately");
            drop(pending);
            (self.operation)();
            return;
        };

        let operation = self.operation.clone();
        let delay = self.delay;
        *pending = Some(runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            operation();
        }));
    }

    /// Discards the pending run, if any.
    ///
    /// Returns `true` if a run was pending. Safe to call at any time.
    pub fn cancel(&self) -> bool {
        match self.lock_pending().take() {
            Some(handle) => {
                let was_pending = !handle.is_finished();
                handle.abort();
                was_pending
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.lock_pending()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    fn lock_pending(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for Debouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("delay", &self.delay)
            .field("pending", &self.is_pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const DELAY: Duration = Duration::from_millis(500);

    fn counting_debouncer() -> (Arc<AtomicUsize>, Debouncer) {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let debouncer = Debouncer::new(DELAY, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (count, debouncer)
    }

    async fn settle(duration: Duration) {
        tokio::time::sleep(duration).await;
        tokio::task::yield_now().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_once_after_quiet_period() {
        let (count, debouncer) = counting_debouncer();

        debouncer.call();
        assert!(debouncer.is_pending());
        settle(DELAY - Duration::from_millis(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        settle(Duration::from_millis(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_calls_coalesce_and_reschedule() {
        let (count, debouncer) = counting_debouncer();

        debouncer.call();
        settle(Duration::from_millis(300)).await;
        debouncer.call();
        settle(Duration::from_millis(300)).await;
        // 600ms after the first call but only 300ms after the last
        assert_eq!(count.load(Ordering::SeqCst), 0);

        settle(Duration::from_millis(201)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_discards_pending_run() {
        let (count, debouncer) = counting_debouncer();

        debouncer.call();
        assert!(debouncer.cancel());
        settle(DELAY * 2).await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
        // Nothing pending now
        assert!(!debouncer.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn test_can_be_rearmed_after_firing() {
        let (count, debouncer) = counting_debouncer();

        debouncer.call();
        settle(DELAY * 2).await;
        debouncer.call();
        settle(DELAY * 2).await;

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_without_runtime_runs_immediately() {
        let (count, debouncer) = counting_debouncer();
        debouncer.call();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
