//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use cilia_config::ConfigError;
use cilia_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(unused_assignments)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to device at {url}")]
    #[diagnostic(
        code(cilia::connection_failed),
        help(
            "Check that the Cilia SDK service is running and reachable.\n\
             URL: {url}\n\
             Try: cilia --host <HOST> --port <PORT> profile send"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Device connection lost: {reason}")]
    #[diagnostic(
        code(cilia::connection_lost),
        help("The device closed the session or stopped responding. Run the command again.")
    )]
    ConnectionLost { reason: String },

    #[error("{what} was not delivered: the device session closed first")]
    #[diagnostic(code(cilia::not_delivered))]
    NotDelivered { what: String },

    // ── Timeout ──────────────────────────────────────────────────────

    #[error("Device {operation} timed out after {millis}ms")]
    #[diagnostic(
        code(cilia::timeout),
        help("Increase the limit with --timeout (seconds, 0 for none) or check the device.")
    )]
    Timeout { operation: String, millis: u64 },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(cilia::validation))]
    Validation { field: String, reason: String },

    #[error("Unknown group '{name}'")]
    #[diagnostic(
        code(cilia::unknown_group),
        help("Use a group ID (0-255) or one of the profile's groups: {available}")
    )]
    UnknownGroup { name: String, available: String },

    #[error("Protocol error: {message}")]
    #[diagnostic(code(cilia::protocol))]
    Protocol { message: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(cilia::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: cilia config init --name <NAME>"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(cilia::config), help("Check the config file at: {path}"))]
    Config { message: String, path: String },

    // ── IO / Serialization ───────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(cilia::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. }
            | Self::ConnectionLost { .. }
            | Self::NotDelivered { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::UnknownGroup { .. } => exit_code::USAGE,
            Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed {
                url,
                source: reason.into(),
            },
            CoreError::Timeout {
                operation,
                timeout_ms,
            } => CliError::Timeout {
                operation: operation.into(),
                millis: timeout_ms,
            },
            CoreError::Transport { reason } => CliError::ConnectionLost { reason },
            CoreError::Protocol { message } => CliError::Protocol { message },
            CoreError::Config { message } => CliError::Validation {
                field: "device".into(),
                reason: message,
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
                path: cilia_config::config_path().display().to_string(),
            },
        }
    }
}
