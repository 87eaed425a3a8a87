//! SSE (Server-Sent Events) delivery of job results.
//!
//! Converts a channel of ResultItems into an SSE stream: one `data:` event
//! per item, followed by a `[DONE]` sentinel.

use axum::response::sse::Event;
use futures::stream::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use crate::adapter::ResultItem;

/// Final event sent once the job's results are exhausted.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Convert a result item receiver into an SSE stream.
pub fn results_to_sse_stream(
    rx: mpsc::Receiver<ResultItem>,
) -> impl Stream<Item = Result<Event, std::convert::Infallible>> {
    ReceiverStream::new(rx)
        .map(|item| {
            let data = serde_json::to_string(&item).unwrap_or_default();
            Ok(Event::default().data(data))
        })
        // Append the [DONE] sentinel after all items.
        .chain(tokio_stream::once(Ok(Event::default().data(DONE_SENTINEL))))
}
