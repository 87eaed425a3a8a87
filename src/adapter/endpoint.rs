//! Route-to-endpoint mapping.
//!
//! Routes are OpenAI-style paths chosen by the caller; endpoints are the
//! Ollama-native paths they land on. Mapping is an ordered table of
//! `(marker, endpoint)` pairs: the first rule whose marker occurs in the route
//! has that marker replaced, and no further rules are applied. Routes that
//! match nothing go through unchanged so the backend decides whether they
//! exist.

use std::fmt;

/// Route that selects model listing instead of forwarding.
pub const MODELS_ROUTE: &str = "/v1/models";

/// Backend endpoint for model listing (GET).
pub const MODELS_ENDPOINT: &str = "/api/tags";

/// Backend-native chat endpoint.
pub const CHAT_ENDPOINT: &str = "/api/chat";

/// Backend-native completion endpoint.
pub const GENERATE_ENDPOINT: &str = "/api/generate";

/// Route used when a job carries none.
pub const DEFAULT_ROUTE: &str = CHAT_ENDPOINT;

/// Substitution rules, evaluated in order.
pub const ROUTE_TABLE: &[(&str, &str)] = &[
    ("/v1/chat/completions", CHAT_ENDPOINT),
    ("/v1/completions", GENERATE_ENDPOINT),
];

/// A resolved backend-native path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint(String);

impl Endpoint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolve a route to the backend endpoint it should be POSTed to.
pub fn resolve(route: &str) -> Endpoint {
    let mapped = ROUTE_TABLE
        .iter()
        .find(|(marker, _)| route.contains(*marker))
        .map(|&(marker, target)| route.replace(marker, target));

    Endpoint(mapped.unwrap_or_else(|| route.to_string()))
}

/// Resolve an optional route, treating absence as [`DEFAULT_ROUTE`].
pub fn resolve_or_default(route: Option<&str>) -> Endpoint {
    resolve(route.unwrap_or(DEFAULT_ROUTE))
}
