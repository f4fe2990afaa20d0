//! Server-Sent Events (SSE) stream for real-time timer updates.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use afterglow_app::ports::{Countdown, DeviceActuator, DeviceDirectory, EventNotifier};

use crate::state::AppState;

/// `GET /api/events/stream` — SSE stream of timer lifecycle events.
///
/// Subscribes to the event bus broadcast channel and sends JSON-encoded
/// `TimerEvent`s as SSE `data:` frames. The stream continues until the
/// client disconnects or the event bus is closed.
pub async fn stream<A, N, C, D>(
    State(state): State<AppState<A, N, C, D>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>
where
    A: DeviceActuator + 'static,
    N: EventNotifier + 'static,
    C: Countdown + 'static,
    D: DeviceDirectory + 'static,
{
    let event_rx = state.event_bus.subscribe();
    let event_stream = BroadcastStream::new(event_rx).filter_map(|result| match result {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(json) => Some(Ok(Event::default().data(json))),
            Err(err) => {
                tracing::warn!(%err, "failed to serialize event to JSON for SSE stream");
                None
            }
        },
        Err(tokio_stream::wrappers::errors::BroadcastStreamRecvError::Lagged(n)) => {
            tracing::warn!(
                skipped = n,
                "SSE subscriber lagged, some events were dropped"
            );
            None
        }
    });

    Sse::new(event_stream).keep_alive(KeepAlive::default())
}
