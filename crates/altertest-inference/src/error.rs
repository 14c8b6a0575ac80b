//! Inference backend error types.

use thiserror::Error;

/// Errors that can occur when calling an inference service.
///
/// These never reach the participant: the inference client turns them into
/// an `unknown` verdict.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The service answered with a non-success status.
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The response body was not the expected `{ "output": ... }` shape.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}
