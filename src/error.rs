//! Error types for dcpctl
//!
//! Provides a unified error type for all operations. The variants follow
//! the failure categories a caller has to tell apart: a bad command name,
//! bad arguments, an undecodable field, a desynchronized stream, and a
//! device that stopped answering.

use std::time::Duration;

use thiserror::Error;

use crate::protocol::Record;

/// Result type alias using DcpError
pub type Result<T> = std::result::Result<T, DcpError>;

/// Unified error type for dcpctl operations
#[derive(Debug, Error)]
pub enum DcpError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Registry / Catalog Errors
    // -------------------------------------------------------------------------
    /// Unknown command name or key, or an invalid message table.
    #[error("Configuration error: {0}")]
    Configuration(String),

    // -------------------------------------------------------------------------
    // Request Construction Errors
    // -------------------------------------------------------------------------
    /// The caller supplied the wrong number or type of arguments.
    /// Nothing has been sent when this is returned.
    #[error("Parameter error in {command}.{field}: {reason}")]
    Parameter {
        command: String,
        field: String,
        reason: String,
    },

    // -------------------------------------------------------------------------
    // Response Decoding Errors
    // -------------------------------------------------------------------------
    /// A byte range of a response payload could not be decoded.
    ///
    /// `partial` holds the fields decoded before the failing one.
    #[error("Malformed field {command}.{field} (bytes {start}..{end}): {reason}")]
    MalformedField {
        command: String,
        field: String,
        start: usize,
        end: usize,
        reason: String,
        partial: Box<Record>,
    },

    // -------------------------------------------------------------------------
    // Framing Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Timed out after {0:?} waiting for response")]
    Timeout(Duration),

    #[error("Connection error: {0}")]
    Connection(String),
}

/// Framing-level failures.
///
/// Most leave the stream position unknown. An unknown key or an empty
/// payload is only detected after the whole frame was read, so the
/// connection stays aligned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("header mismatch: got {0}")]
    HeaderMismatch(String),

    #[error("unknown response key {0}")]
    UnknownResponseKey(String),

    #[error("invalid BER length: {0}")]
    InvalidBerLength(String),

    #[error("truncated frame: needed {needed} bytes, {available} available")]
    Truncated { needed: usize, available: usize },

    #[error("response {0} carries no status byte")]
    MissingStatusByte(String),

    #[error("request id mismatch: sent {sent}, received {received}")]
    RequestIdMismatch { sent: u32, received: u32 },
}

impl DcpError {
    /// Build a parameter error
    pub fn parameter(
        command: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        DcpError::Parameter {
            command: command.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the connection that produced this error can no longer be used.
    ///
    /// A malformed field is not fatal: the whole frame was read before
    /// decoding started, so the stream is still aligned.
    pub fn is_connection_fatal(&self) -> bool {
        match self {
            DcpError::Io(_) | DcpError::Timeout(_) | DcpError::Connection(_) => true,
            DcpError::Protocol(err) => err.is_desynchronizing(),
            _ => false,
        }
    }
}

impl ProtocolError {
    /// Whether the stream position is unknown after this error
    pub fn is_desynchronizing(&self) -> bool {
        !matches!(
            self,
            ProtocolError::UnknownResponseKey(_) | ProtocolError::MissingStatusByte(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(DcpError::Timeout(Duration::from_secs(1)).is_connection_fatal());
        assert!(DcpError::Protocol(ProtocolError::HeaderMismatch("00".into())).is_connection_fatal());
        assert!(!DcpError::Protocol(ProtocolError::UnknownResponseKey("ffffff".into()))
            .is_connection_fatal());
        assert!(!DcpError::parameter("GetCPLInfo", "uuid", "missing").is_connection_fatal());
        assert!(!DcpError::Configuration("unknown command".into()).is_connection_fatal());
    }

    #[test]
    fn test_parameter_message_names_field() {
        let err = DcpError::parameter("ValidateCPL", "level", "expected an integer");
        assert_eq!(
            err.to_string(),
            "Parameter error in ValidateCPL.level: expected an integer"
        );
    }
}
