//! Error types for the filter module.

use serde::Serialize;
use thiserror::Error;

use crate::protocol::CodecError;

/// Errors that can occur while running one filter on one record.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterError {
    /// The input record cannot be encoded for this filter.
    #[error("Cannot encode field '{field}': {reason}")]
    Encoding { field: String, reason: String },

    /// The filter's output is not valid for the negotiated protocol.
    #[error("Protocol violation: {reason}")]
    ProtocolViolation { reason: String },

    /// The filter exited unsuccessfully.
    #[error("Filter exited with {}", describe_exit(*.code))]
    ProcessFailed { code: Option<i32>, stderr: String },

    /// The filter could not be started.
    #[error("Failed to spawn filter {path}: {reason}")]
    SpawnFailed { path: String, reason: String },

    /// The filter did not finish within its timeout.
    #[error("Filter timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// The batch was cancelled while the filter was running.
    #[error("Filter cancelled")]
    Cancelled,

    /// I/O error on the filter's pipes.
    #[error("I/O error: {reason}")]
    Io { reason: String },
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl FilterError {
    /// Creates a new process failed error.
    pub fn process_failed(code: Option<i32>, stderr: impl Into<String>) -> Self {
        Self::ProcessFailed {
            code,
            stderr: stderr.into(),
        }
    }

    /// Stable snake_case label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Encoding { .. } => "encoding",
            Self::ProtocolViolation { .. } => "protocol_violation",
            Self::ProcessFailed { .. } => "process_failed",
            Self::SpawnFailed { .. } => "spawn_failed",
            Self::Timeout { .. } => "timeout",
            Self::Cancelled => "cancelled",
            Self::Io { .. } => "io",
        }
    }

    /// Whether re-running the filter could plausibly succeed.
    ///
    /// The engine never retries on its own; this is for callers that do.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Io { .. })
    }
}

impl From<CodecError> for FilterError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Encoding { field, reason } => Self::Encoding {
                field: field.to_string(),
                reason,
            },
            CodecError::ProtocolViolation { reason } => Self::ProtocolViolation { reason },
        }
    }
}

impl From<std::io::Error> for FilterError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            reason: err.to_string(),
        }
    }
}
