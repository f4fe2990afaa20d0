//! Notifier port — publishes timer lifecycle events to the realtime layer.

use std::future::Future;
use std::sync::Arc;

use afterglow_domain::error::AfterglowError;
use afterglow_domain::event::TimerEvent;

/// Publishes `timer_started` / `timer_deleted` notifications.
///
/// Publishing must succeed even when nobody is listening.
pub trait EventNotifier: Send + Sync {
    fn notify(&self, event: TimerEvent) -> impl Future<Output = Result<(), AfterglowError>> + Send;
}

impl<T: EventNotifier> EventNotifier for Arc<T> {
    fn notify(&self, event: TimerEvent) -> impl Future<Output = Result<(), AfterglowError>> + Send {
        T::notify(self, event)
    }
}
