//! Transport abstraction between the command bridge and the backend.

use super::command::Invocation;
use super::failure::Failure;
use async_trait::async_trait;
use serde_json::Value;

/// Delivers invocations to the native backend.
///
/// A transport performs exactly one round trip per call and returns the raw
/// JSON result, or the backend's failure value untouched. Implementations do
/// not retry, cache, batch or reinterpret failures.
///
/// # Implementations
///
/// - [`ProcessTransport`](super::ProcessTransport): newline-delimited JSON
///   with a backend child process
/// - [`StubBackend`](super::StubBackend): in-process backend for tests and the
///   offline mode
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one invocation and waits for its outcome.
    ///
    /// # Errors
    ///
    /// Returns the backend's failure value, or a string failure when the
    /// backend cannot be reached.
    async fn invoke(&self, invocation: Invocation) -> Result<Value, Failure>;
}
