//! HTTP access to the Ollama backend.
//!
//! [`Backend`] is the seam between orchestration and the network so the
//! adapter can be driven by an in-memory backend in tests. [`HttpBackend`] is
//! the real thing, built on `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use serde_json::Value;
use tracing::debug;

use crate::adapter::error::AdapterError;
use crate::config::BackendConfig;

/// Content type Ollama uses for streamed responses.
pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// Body of a backend response.
pub enum ResponseBody {
    /// The whole body, as raw bytes.
    Complete(Bytes),

    /// A streamed NDJSON body. Only produced for status 200.
    Stream(BoxStream<'static, Result<Bytes, AdapterError>>),
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Complete(body) => f.debug_tuple("Complete").field(body).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

/// Status plus body of one backend exchange.
#[derive(Debug)]
pub struct BackendResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl BackendResponse {
    pub fn complete(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            body: ResponseBody::Complete(body.into()),
        }
    }
}

/// One request/response exchange with the model server.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET <base><path>`.
    async fn get(&self, path: &str) -> Result<BackendResponse, AdapterError>;

    /// `POST <base><path>` with a JSON body.
    async fn post_json(&self, path: &str, body: &Value) -> Result<BackendResponse, AdapterError>;

    /// Base address requests are sent to.
    fn base_url(&self) -> &str;
}

/// `reqwest`-backed [`Backend`].
///
/// Idle connections are not pooled: every exchange opens its own connection
/// and releases it when the response is dropped.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, AdapterError> {
        let mut builder = reqwest::Client::builder().pool_max_idle_per_host(0);
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read(response: reqwest::Response) -> Result<BackendResponse, AdapterError> {
        let status = response.status().as_u16();

        if status == 200 && is_ndjson(response.headers()) {
            debug!(status, "Streaming NDJSON response");
            let chunks = response
                .bytes_stream()
                .map(|chunk| chunk.map_err(AdapterError::from))
                .boxed();
            return Ok(BackendResponse {
                status,
                body: ResponseBody::Stream(chunks),
            });
        }

        let body = response.bytes().await?;
        debug!(status, bytes = body.len(), "Backend responded");
        Ok(BackendResponse::complete(status, body))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn get(&self, path: &str) -> Result<BackendResponse, AdapterError> {
        let url = self.url(path);
        debug!(url = %url, "GET");
        let response = self.client.get(&url).send().await?;
        Self::read(response).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<BackendResponse, AdapterError> {
        let url = self.url(path);
        debug!(url = %url, "POST");
        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;
        Self::read(response).await
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn is_ndjson(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with(NDJSON_CONTENT_TYPE))
}
