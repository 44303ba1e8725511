//! Error types for the protocol module.

use thiserror::Error;

/// Errors raised while encoding or decoding a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A field cannot be represented in the line-delimited format.
    #[error("Field '{field}' cannot be encoded: {reason}")]
    Encoding { field: &'static str, reason: String },

    /// Filter output does not match the negotiated protocol.
    #[error("Protocol violation: {reason}")]
    ProtocolViolation { reason: String },
}

impl CodecError {
    /// Creates a new protocol violation error.
    pub fn violation(reason: impl Into<String>) -> Self {
        Self::ProtocolViolation {
            reason: reason.into(),
        }
    }
}
