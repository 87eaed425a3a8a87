//! ollama-job-adapter: forwards inference jobs to a local Ollama server.
//!
//! A job names an OpenAI-style route and carries a JSON payload. The adapter
//! maps the route onto Ollama's native API, performs one HTTP exchange and
//! hands back the result as a lazy stream of JSON items, with every failure
//! folded into an `{"error": ...}` item.
//!
//! Hosted either by an HTTP job server or as a one-shot CLI.

pub mod adapter;
pub mod config;
pub mod server;
