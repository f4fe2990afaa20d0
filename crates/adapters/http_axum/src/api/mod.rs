//! JSON REST API handler modules.

pub mod devices;
pub mod sse;
pub mod timers;

use axum::Router;
use axum::routing::get;

use afterglow_app::ports::{Countdown, DeviceActuator, DeviceDirectory, EventNotifier};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<A, N, C, D>() -> Router<AppState<A, N, C, D>>
where
    A: DeviceActuator + 'static,
    N: EventNotifier + 'static,
    C: Countdown + 'static,
    D: DeviceDirectory + 'static,
{
    Router::new()
        // Timers
        .route("/timers", get(timers::list::<A, N, C, D>))
        .route(
            "/timers/{device}",
            axum::routing::post(timers::trigger::<A, N, C, D>)
                .delete(timers::cancel::<A, N, C, D>),
        )
        .route(
            "/timers/{device}/running",
            get(timers::running::<A, N, C, D>),
        )
        // Devices
        .route("/devices", get(devices::list::<A, N, C, D>))
        .route("/devices/search", get(devices::search::<A, N, C, D>))
        // Realtime
        .route("/events/stream", get(sse::stream::<A, N, C, D>))
}
