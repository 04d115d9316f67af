//! Canonical-event stream for workflow hosts.
//!
//! `GET /events` subscribes to the event bus and streams every canonical
//! event (webhook- and queue-sourced) as server-sent events. A host must
//! keep a subscription open for queue messages to count as delivered;
//! without one the poller reports them failed rather than acknowledging.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::{Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;

use crate::state::AppState;

/// GET /events - Stream canonical events as SSE.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = state.bus.subscribe();
    tracing::info!("event stream subscriber attached");

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(event) => serde_json::to_string(&event)
            .ok()
            .map(|json| Ok(Event::default().event("canonical").data(json))),
        // A lagged subscriber skips the overwritten events and continues.
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
