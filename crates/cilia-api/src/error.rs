use thiserror::Error;

/// Top-level error type for the `cilia-api` crate.
///
/// Covers the wire protocol and the WebSocket transport.
/// `cilia-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Endpoint ────────────────────────────────────────────────────
    /// Host/port pair does not form a valid `ws://` URL.
    #[error("Invalid device endpoint: {0}")]
    InvalidEndpoint(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── WebSocket ───────────────────────────────────────────────────
    /// WebSocket handshake failed or the endpoint was unreachable.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    /// Writing a frame to an open session failed.
    #[error("WebSocket send failed: {0}")]
    Send(String),

    /// The session was already closed when a write was attempted.
    #[error("WebSocket session closed")]
    Closed,

    // ── Protocol ────────────────────────────────────────────────────
    /// A group envelope was requested with no group IDs.
    ///
    /// Callers wanting every group must use `GroupTarget::All`, which
    /// sends the command unwrapped.
    #[error("Group envelope requires at least one group ID")]
    EmptyGroupTarget,

    /// JSON encoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Returns `true` if retrying the connection might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::WebSocketConnect(_) | Self::Send(_) | Self::Closed)
    }

    /// Returns `true` for mistakes at the call site rather than I/O failures.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyGroupTarget | Self::InvalidEndpoint(_) | Self::InvalidUrl(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_errors_are_transient() {
        assert!(Error::WebSocketConnect("refused".into()).is_transient());
        assert!(Error::Send("broken pipe".into()).is_transient());
        assert!(Error::Closed.is_transient());
        assert!(!Error::EmptyGroupTarget.is_transient());
    }

    #[test]
    fn caller_errors_are_not_transient() {
        let err = Error::InvalidEndpoint("ws://:1995".into());
        assert!(err.is_caller_error());
        assert!(!err.is_transient());
        assert!(Error::EmptyGroupTarget.is_caller_error());
    }
}
