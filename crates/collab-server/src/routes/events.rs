use axum::extract::State;
use axum::response::sse::{Event as SseEvent, KeepAlive, Sse};
use futures::stream;
use futures::StreamExt as _;
use std::convert::Infallible;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::bus::Event;
use crate::state::AppState;

/// GET /api/events — one SSE message per bus event, JSON-encoded. The first
/// message is `{"type":"connected"}`; keepalive comment lines keep proxies
/// from closing idle connections. When the client goes away the receiver is
/// dropped and the bus prunes the subscription on its next publish.
pub async fn sse_events(State(app): State<AppState>) -> impl axum::response::IntoResponse {
    let (_, rx) = app.bus.subscribe();

    let hello = stream::once(async { Event::Connected });
    let stream = hello
        .chain(UnboundedReceiverStream::new(rx))
        .map(|event| {
            let data = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
            Ok::<SseEvent, Infallible>(SseEvent::default().data(data))
        });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
