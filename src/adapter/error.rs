//! Failures that can occur while talking to the backend.
//!
//! None of these ever reach the caller of [`Adapter::generate`](super::engine::Adapter::generate)
//! as an `Err`; they are folded into `{"error": ...}` result items.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdapterError {
    /// Connection refused, timeout, or a failure while reading the body.
    #[error("{0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered 200 but the body was not valid JSON.
    #[error("invalid JSON in backend response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A streamed body ended without a single JSON line.
    #[error("empty response body")]
    EmptyBody,
}
