//! Job descriptors coming in and result items going out.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::adapter::endpoint::DEFAULT_ROUTE;

/// A request descriptor supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobInput {
    /// Logical route, e.g. `/v1/chat/completions`. Absent means [`DEFAULT_ROUTE`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<String>,

    /// Payload forwarded to the backend as the request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Map<String, Value>>,
}

impl JobInput {
    pub fn new(route: impl Into<String>, input: Map<String, Value>) -> Self {
        Self {
            route: Some(route.into()),
            input: Some(input),
        }
    }

    /// The route, falling back to the default inference route.
    pub fn route(&self) -> &str {
        self.route.as_deref().unwrap_or(DEFAULT_ROUTE)
    }

    /// The payload as a JSON object, `{}` when absent.
    pub fn body(&self) -> Value {
        Value::Object(self.input.clone().unwrap_or_default())
    }
}

/// One unit of output: either the backend's JSON verbatim or `{"error": <message>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultItem(Value);

impl ResultItem {
    /// Wrap a decoded backend payload without touching it.
    pub fn success(value: Value) -> Self {
        Self(value)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self(json!({ "error": message.into() }))
    }

    /// True when the item carries a top-level `"error"` key.
    ///
    /// A backend payload that itself has an `"error"` key is indistinguishable
    /// from an adapter failure here.
    pub fn is_error(&self) -> bool {
        self.0.get("error").is_some()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.0.get("error").and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}
