//! Tokio-backed countdown implementation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::ports::{Countdown, CountdownHandle, ExpiryJob};

/// [`Countdown`] implementation that runs each job on its own tokio task.
///
/// Cancellation aborts the sleeping task. A job that has already started
/// running is allowed to complete; callers resolve that race themselves by
/// validating the handle the job is called with.
#[derive(Debug, Default)]
pub struct TokioCountdown {
    tasks: Arc<Mutex<HashMap<u64, tokio::task::AbortHandle>>>,
    next_id: AtomicU64,
}

impl TokioCountdown {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of countdowns currently being tracked.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.lock().map(|tasks| tasks.len()).unwrap_or(0)
    }
}

impl Countdown for TokioCountdown {
    fn schedule(&self, delay: Duration, job: ExpiryJob) -> CountdownHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = CountdownHandle::new(id);

        // The deadline is anchored here, not at the task's first poll, so a
        // busy runtime cannot push the firing past the promised expiry.
        let deadline = tokio::time::Instant::now() + delay;
        let tasks = Arc::clone(&self.tasks);
        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            job(handle).await;
            if let Ok(mut tasks) = tasks.lock() {
                tasks.remove(&id);
            }
        });

        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.insert(id, task.abort_handle());
        }
        tracing::trace!(countdown = id, delay_ms = delay.as_millis(), "countdown armed");
        handle
    }

    fn cancel(&self, handle: CountdownHandle) {
        let Ok(mut tasks) = self.tasks.lock() else {
            return;
        };
        if let Some(task) = tasks.remove(&handle.id()) {
            task.abort();
            tracing::trace!(countdown = handle.id(), "countdown cancelled");
        } else {
            tracing::debug!(countdown = handle.id(), "cancel of unknown countdown ignored");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    fn flag_job(fired: &Arc<AtomicBool>) -> ExpiryJob {
        let fired = Arc::clone(fired);
        Box::new(move |_handle| {
            Box::pin(async move {
                fired.store(true, Ordering::SeqCst);
            })
        })
    }

    #[tokio::test(start_paused = true)]
    async fn should_run_job_after_delay() {
        let countdown = TokioCountdown::new();
        let fired = Arc::new(AtomicBool::new(false));
        countdown.schedule(Duration::from_secs(5), flag_job(&fired));

        tokio::time::advance(Duration::from_secs(4)).await;
        settle().await;
        assert!(!fired.load(Ordering::SeqCst));

        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn should_measure_delay_from_arm_time_not_first_poll() {
        let countdown = TokioCountdown::new();
        let fired = Arc::new(AtomicBool::new(false));
        countdown.schedule(Duration::from_secs(5), flag_job(&fired));

        // Advance past the deadline before the spawned task has ever been
        // polled; the countdown must still fire on time.
        tokio::time::advance(Duration::from_secs(5)).await;
        settle().await;

        assert!(fired.load(Ordering::SeqCst));
        assert_eq!(countdown.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn should_not_run_job_when_cancelled_before_expiry() {
        let countdown = TokioCountdown::new();
        let fired = Arc::new(AtomicBool::new(false));
        let handle = countdown.schedule(Duration::from_secs(5), flag_job(&fired));

        countdown.cancel(handle);
        tokio::time::advance(Duration::from_secs(10)).await;
        settle().await;

        assert!(!fired.load(Ordering::SeqCst));
        assert_eq!(countdown.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn should_fire_zero_delay_immediately() {
        let countdown = TokioCountdown::new();
        let fired = Arc::new(AtomicBool::new(false));
        countdown.schedule(Duration::ZERO, flag_job(&fired));

        settle().await;
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn should_pass_own_handle_into_job() {
        let countdown = TokioCountdown::new();
        let seen = Arc::new(Mutex::new(None));
        let seen_in_job = Arc::clone(&seen);
        let handle = countdown.schedule(
            Duration::ZERO,
            Box::new(move |own| {
                Box::pin(async move {
                    *seen_in_job.lock().unwrap() = Some(own);
                })
            }),
        );

        settle().await;
        assert_eq!(*seen.lock().unwrap(), Some(handle));
    }

    #[tokio::test]
    async fn should_ignore_cancel_of_unknown_handle() {
        let countdown = TokioCountdown::new();
        countdown.cancel(CountdownHandle::new(42));
        assert_eq!(countdown.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn should_forget_task_after_it_fires() {
        let countdown = TokioCountdown::new();
        let fired = Arc::new(AtomicBool::new(false));
        countdown.schedule(Duration::from_secs(1), flag_job(&fired));
        assert_eq!(countdown.pending(), 1);

        tokio::time::advance(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(countdown.pending(), 0);
    }
}
