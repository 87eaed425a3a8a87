//! Adapter orchestration: one job in, a lazy stream of result items out.
//!
//! Each call to [`Adapter::generate`]:
//! 1. Picks model listing (route `/v1/models`) or forwarding
//! 2. Resolves the backend endpoint for forwarded jobs
//! 3. Performs exactly one exchange with the backend
//! 4. Normalizes the outcome into at least one [`ResultItem`]
//!
//! Nothing happens until the returned stream is first polled, and dropping
//! it cancels any in-flight request.

use futures::future;
use futures::stream::{self, BoxStream};
use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::adapter::backend::{Backend, BackendResponse, HttpBackend, ResponseBody};
use crate::adapter::endpoint::{resolve_or_default, MODELS_ENDPOINT, MODELS_ROUTE};
use crate::adapter::error::AdapterError;
use crate::adapter::job::{JobInput, ResultItem};
use crate::adapter::normalize::{normalize_error, normalize_response, ErrorDetail, NdjsonDecoder};
use crate::config::BackendConfig;

/// Stateless request adapter in front of an Ollama backend.
#[derive(Debug, Clone)]
pub struct Adapter<B = HttpBackend> {
    backend: B,
}

impl Adapter<HttpBackend> {
    /// Build an adapter talking HTTP to the configured backend.
    pub fn from_config(config: &BackendConfig) -> Result<Self, AdapterError> {
        Ok(Self::new(HttpBackend::new(config)?))
    }
}

impl<B: Backend> Adapter<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Run one job, yielding its results as they become available.
    ///
    /// The stream always yields at least one item. Failures show up as
    /// `{"error": ...}` items, never as a panic or an `Err`.
    pub fn generate<'a>(&'a self, job: &'a JobInput) -> BoxStream<'a, ResultItem> {
        stream::once(async move {
            if job.route() == MODELS_ROUTE {
                self.list_models().await
            } else {
                self.forward(job).await
            }
        })
        .flatten()
        .boxed()
    }

    async fn list_models(&self) -> BoxStream<'static, ResultItem> {
        info!(endpoint = MODELS_ENDPOINT, "Listing models");
        let outcome = self.backend.get(MODELS_ENDPOINT).await;
        into_items(outcome, ErrorDetail::StatusOnly)
    }

    async fn forward(&self, job: &JobInput) -> BoxStream<'static, ResultItem> {
        let route = job.route();
        let endpoint = resolve_or_default(job.route.as_deref());
        let body = job.body();

        info!(route, endpoint = %endpoint, "Forwarding job");
        debug!(body = %body, "Request payload");

        let outcome = self.backend.post_json(endpoint.as_str(), &body).await;
        into_items(outcome, ErrorDetail::StatusWithBody)
    }
}

/// Turn the outcome of one exchange into result items.
fn into_items(
    outcome: Result<BackendResponse, AdapterError>,
    detail: ErrorDetail,
) -> BoxStream<'static, ResultItem> {
    match outcome {
        Ok(BackendResponse {
            status,
            body: ResponseBody::Complete(body),
        }) => {
            let item = normalize_response(status, &body, detail);
            if item.is_error() {
                warn!(status, "Backend request failed");
            }
            stream::once(future::ready(item)).boxed()
        }
        Ok(BackendResponse {
            body: ResponseBody::Stream(chunks),
            ..
        }) => ndjson_items(chunks),
        Err(e) => {
            warn!(error = %e, "Backend unreachable");
            stream::once(future::ready(normalize_error(&e))).boxed()
        }
    }
}

/// Decode a streamed NDJSON body into items, one per line.
fn ndjson_items(
    chunks: BoxStream<'static, Result<bytes::Bytes, AdapterError>>,
) -> BoxStream<'static, ResultItem> {
    stream::unfold(
        (chunks, NdjsonDecoder::new(), false),
        |(mut chunks, mut decoder, done)| async move {
            if done {
                return None;
            }
            loop {
                match chunks.next().await {
                    Some(Ok(bytes)) => {
                        let items = decoder.push(&bytes);
                        if !items.is_empty() {
                            let done = decoder.is_failed();
                            return Some((stream::iter(items), (chunks, decoder, done)));
                        }
                    }
                    Some(Err(e)) => {
                        warn!(error = %e, emitted = decoder.emitted(), "Response stream broke off");
                        let items = vec![normalize_error(&e)];
                        return Some((stream::iter(items), (chunks, decoder, true)));
                    }
                    None => {
                        let tail = decoder.finish()?;
                        return Some((stream::iter(vec![tail]), (chunks, decoder, true)));
                    }
                }
            }
        },
    )
    .flatten()
    .boxed()
}
