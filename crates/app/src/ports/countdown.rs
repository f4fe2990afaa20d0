//! Countdown port — explicit deferred-callback abstraction.
//!
//! The scheduler never owns raw timer tasks; it arms a countdown through this
//! port and keeps only the returned handle. The job receives its own handle
//! when it fires so the scheduler can tell a live expiry from one that lost a
//! race against cancellation.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Opaque reference to a scheduled countdown, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CountdownHandle(u64);

impl CountdownHandle {
    /// Wrap a raw countdown id.
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw countdown id.
    #[must_use]
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Future produced by an expiry job.
pub type ExpiryFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// One-shot job run when a countdown expires.
///
/// The job must capture an immutable snapshot of whatever it needs; it is
/// handed its own [`CountdownHandle`] at fire time.
pub type ExpiryJob = Box<dyn FnOnce(CountdownHandle) -> ExpiryFuture + Send>;

/// Arms and cancels deferred callbacks.
pub trait Countdown: Send + Sync {
    /// Run `job` after `delay`. A zero delay fires as soon as possible.
    fn schedule(&self, delay: Duration, job: ExpiryJob) -> CountdownHandle;

    /// Best-effort cancellation of a scheduled job.
    ///
    /// If the job has already begun executing, it is allowed to complete;
    /// authoritative race resolution is the caller's responsibility (handle
    /// validation under its own lock).
    fn cancel(&self, handle: CountdownHandle);
}

impl<T: Countdown> Countdown for Arc<T> {
    fn schedule(&self, delay: Duration, job: ExpiryJob) -> CountdownHandle {
        T::schedule(self, delay, job)
    }

    fn cancel(&self, handle: CountdownHandle) {
        T::cancel(self, handle);
    }
}
