// src/error.rs
//
// Error types for the elevator link: telemetry rejections, command validation,
// and connection/link failures.

use std::io;

use thiserror::Error;

/// Why a framed telemetry line was not turned into a record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RejectReason {
    #[error("empty line")]
    EmptyLine,

    #[error("Ignored (fields={count}): {raw}")]
    FieldCountMismatch { count: usize, raw: String },

    #[error("Field {index} failed to parse | fields: {fields:?}")]
    FieldParseError { index: usize, fields: Vec<String> },
}

/// An outgoing command that cannot be put on the wire.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("origin {0} out of range (0-3)")]
    OriginOutOfRange(i32),

    #[error("destination {0} out of range (0-3)")]
    DestinationOutOfRange(i32),
}

/// Connection and link-level failures.
#[derive(Error, Debug)]
pub enum LinkError {
    #[error("Failed to open {port}: {source}")]
    Connect {
        port: String,
        #[source]
        source: io::Error,
    },

    #[error("Already connected to {0}")]
    AlreadyConnected(String),

    #[error("Not connected")]
    NotConnected,

    #[error("Serial link lost: {0}")]
    LinkLost(#[source] io::Error),

    #[error("Serial write error: {0}")]
    Write(#[source] io::Error),

    #[error("Invalid command: {0}")]
    Validation(#[from] ValidationError),
}

impl LinkError {
    /// Whether this error dropped an open link back to disconnected.
    pub fn is_link_failure(&self) -> bool {
        matches!(self, LinkError::LinkLost(_) | LinkError::Write(_))
    }
}
