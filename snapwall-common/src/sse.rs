//! Server-Sent Events (SSE) bridge for the realtime channel
//!
//! Converts an `EventChannel` subscription into an axum SSE response so
//! browsers attached to an event's topic receive gallery deltas and presence
//! updates as they happen.

use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use tokio_stream::wrappers::BroadcastStream;
use tracing::{info, warn};

use crate::events::EventChannel;

/// Create an SSE event stream for a new client connection
///
/// Each `GalleryEvent` becomes one SSE event named after its wire type
/// (`image_uploaded`, `image_deleted`, ...) with the JSON payload as data.
/// A subscriber that lags the channel buffer silently skips the missed
/// events; the page-load collection delivery covers the gap.
pub fn subscribe_stream(
    channel: &EventChannel,
) -> impl Stream<Item = std::result::Result<Event, Infallible>> {
    let rx = channel.subscribe();
    let stream = BroadcastStream::new(rx);

    stream.filter_map(|result| async move {
        match result {
            Ok(gallery_event) => {
                let event = Event::default()
                    .event(gallery_event.event_type())
                    .json_data(&gallery_event)
                    .ok();
                event.map(Ok)
            }
            Err(e) => {
                warn!("SSE client lagged channel: {:?}", e);
                None
            }
        }
    })
}

/// Create an axum SSE response for a client attaching to the event topic
pub fn handle_sse_connection(
    channel: &EventChannel,
    keep_alive_secs: u64,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    info!(
        event_id = %channel.event_id(),
        subscribers = channel.subscriber_count(),
        "New SSE client connected"
    );

    Sse::new(subscribe_stream(channel)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(keep_alive_secs))
            .text("keep-alive"),
    )
}
