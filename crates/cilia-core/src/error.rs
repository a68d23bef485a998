// ── Core error types ──
//
// User-facing errors from cilia-core. Consumers never see raw
// WebSocket or JSON failures; the `From<cilia_api::Error>` impl
// translates transport-layer errors into these variants.

use std::time::Duration;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to device at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Device {operation} timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },

    #[error("Device connection lost: {reason}")]
    Transport { reason: String },

    // ── Caller errors ────────────────────────────────────────────────
    #[error("Protocol error: {message}")]
    Protocol { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub(crate) fn timeout(operation: &'static str, limit: Duration) -> Self {
        Self::Timeout {
            operation,
            timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Returns `true` if a later attempt could succeed without any change
    /// on the caller's side.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::Timeout { .. } | Self::Transport { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<cilia_api::Error> for CoreError {
    fn from(err: cilia_api::Error) -> Self {
        match err {
            cilia_api::Error::InvalidEndpoint(endpoint) => CoreError::Config {
                message: format!("Invalid device endpoint: {endpoint}"),
            },
            cilia_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid device URL: {e}"),
            },
            cilia_api::Error::WebSocketConnect(reason) => CoreError::ConnectionFailed {
                url: String::new(),
                reason,
            },
            cilia_api::Error::Send(reason) => CoreError::Transport { reason },
            cilia_api::Error::Closed => CoreError::Transport {
                reason: "session already closed".into(),
            },
            cilia_api::Error::EmptyGroupTarget => CoreError::Protocol {
                message: "group target must name at least one group; use GroupTarget::All to broadcast"
                    .into(),
            },
            cilia_api::Error::Serialization(e) => CoreError::Protocol {
                message: format!("failed to encode message: {e}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_reports_milliseconds() {
        let err = CoreError::timeout("send", Duration::from_millis(1500));
        assert!(matches!(
            err,
            CoreError::Timeout {
                operation: "send",
                timeout_ms: 1500
            }
        ));
        assert_eq!(err.to_string(), "Device send timed out after 1500ms");
    }

    #[test]
    fn api_errors_map_to_domain_variants() {
        let err = CoreError::from(cilia_api::Error::EmptyGroupTarget);
        assert!(matches!(err, CoreError::Protocol { .. }));
        assert!(!err.is_retryable());

        let err = CoreError::from(cilia_api::Error::Send("reset".into()));
        assert!(matches!(err, CoreError::Transport { ref reason } if reason == "reset"));
        assert!(err.is_retryable());

        let err = CoreError::from(cilia_api::Error::InvalidEndpoint("ws://:1".into()));
        assert!(matches!(err, CoreError::Config { .. }));
    }
}
