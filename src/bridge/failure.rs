//! Opaque failure values returned by the backend.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A failure reported across the command bridge.
///
/// The content is backend defined and the bridge never interprets it. The
/// backend usually sends a plain string; anything else is kept verbatim. Local
/// problems (the backend closed, a result did not decode) are carried the same
/// way as a string message so callers handle a single failure shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Failure(Value);

impl Failure {
    /// Wraps a raw failure value as received from the backend.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Creates a failure carrying a plain string.
    pub fn message(message: impl Into<String>) -> Self {
        Self(Value::String(message.into()))
    }

    /// Returns the failure as a string when the backend sent one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }

    /// Returns the raw failure value.
    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.0
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Value::String(text) => f.write_str(text),
            other => write!(f, "{other}"),
        }
    }
}

impl std::error::Error for Failure {}

impl From<&str> for Failure {
    fn from(message: &str) -> Self {
        Self::message(message)
    }
}

impl From<String> for Failure {
    fn from(message: String) -> Self {
        Self::message(message)
    }
}
