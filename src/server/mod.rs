//! HTTP job server hosting the adapter.
//!
//! - [`api`]: Job envelope types and route handlers
//! - [`streaming`]: SSE delivery of result items

pub mod api;
pub mod streaming;
