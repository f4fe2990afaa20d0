//! Shared application state for axum handlers.

use std::sync::Arc;

use afterglow_app::event_bus::InProcessTimerBus;
use afterglow_app::ports::{Countdown, DeviceActuator, DeviceDirectory, EventNotifier};
use afterglow_app::scheduler::DeviceTimerScheduler;
use afterglow_app::services::DirectoryService;

/// Application state shared across all axum handlers.
///
/// Generic over the actuator, notifier, countdown, and directory types to
/// avoid dynamic dispatch. The event bus is held concretely because the SSE
/// handler needs its `subscribe` method, not just the notifier port.
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone` — only the `Arc` wrappers are cloned.
pub struct AppState<A, N, C, D> {
    /// The deferred-action scheduler.
    pub scheduler: Arc<DeviceTimerScheduler<A, N, C>>,
    /// Cached device listing and autocomplete.
    pub directory: Arc<DirectoryService<D>>,
    /// Broadcast bus feeding the SSE stream.
    pub event_bus: Arc<InProcessTimerBus>,
}

impl<A, N, C, D> Clone for AppState<A, N, C, D> {
    fn clone(&self) -> Self {
        Self {
            scheduler: Arc::clone(&self.scheduler),
            directory: Arc::clone(&self.directory),
            event_bus: Arc::clone(&self.event_bus),
        }
    }
}

impl<A, N, C, D> AppState<A, N, C, D>
where
    A: DeviceActuator + 'static,
    N: EventNotifier + 'static,
    C: Countdown + 'static,
    D: DeviceDirectory + 'static,
{
    /// Create a new application state from pre-wrapped `Arc`s.
    ///
    /// The scheduler is born inside an `Arc`, and both the bus and the
    /// directory are typically shared with background tasks, so no unwrapped
    /// constructor is offered.
    pub fn new(
        scheduler: Arc<DeviceTimerScheduler<A, N, C>>,
        directory: Arc<DirectoryService<D>>,
        event_bus: Arc<InProcessTimerBus>,
    ) -> Self {
        Self {
            scheduler,
            directory,
            event_bus,
        }
    }
}
