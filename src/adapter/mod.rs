//! The job adapter.
//!
//! - [`job`]: JobInput and ResultItem
//! - [`endpoint`]: Route-to-endpoint mapping table
//! - [`normalize`]: Response/error normalization and NDJSON decoding
//! - [`backend`]: HTTP access to the model server
//! - [`engine`]: Orchestration of one job into a lazy result stream
//! - [`error`]: Backend failure types

pub mod backend;
pub mod endpoint;
pub mod engine;
pub mod error;
pub mod job;
pub mod normalize;

pub use engine::Adapter;
pub use error::AdapterError;
pub use job::{JobInput, ResultItem};
