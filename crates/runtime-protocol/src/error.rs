//! Error types for the runtime connection.

use std::io;

/// Failures while talking to the language runtime.
///
/// Transport failures ([`RpcError::Io`], [`RpcError::ConnectionClosed`],
/// framing errors) are fatal for the owning debug session. A
/// [`RpcError::Deserialize`] on a single result can be tolerated by callers
/// that have a safe fallback (breakpoint checks degrade to "not activated").
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    /// An I/O error on the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The runtime closed the connection.
    #[error("runtime connection closed")]
    ConnectionClosed,

    /// The Content-Length header was missing or unparseable.
    #[error("malformed framing header")]
    MalformedHeader,

    /// The payload exceeds the configured maximum size.
    #[error("message size {size} exceeds maximum allowed {max}")]
    MessageTooLarge { size: usize, max: usize },

    /// A payload failed to parse as JSON-RPC or as the expected result
    /// shape.
    #[error("malformed runtime payload: {0}")]
    Deserialize(#[source] serde_json::Error),

    /// A request failed to serialize; indicates a bug on our side.
    #[error("request serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The runtime answered a different request than the one in flight.
    #[error("out of order response: expected id {expected}, got {actual}")]
    OutOfOrderResponse { expected: i64, actual: i64 },

    /// The runtime returned a JSON-RPC error object.
    #[error("runtime error {code}: {message}")]
    Runtime { code: i64, message: String },
}

impl RpcError {
    /// Whether this failure only affects the single result it occurred on.
    ///
    /// Anything else poisons the connection and must tear the session down.
    pub fn is_result_shape_error(&self) -> bool {
        matches!(self, RpcError::Deserialize(_))
    }
}
