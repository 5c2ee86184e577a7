//! Error types for rfx
//!
//! Provides a unified error type for all operations.

use std::io;

use thiserror::Error;

use crate::protocol::Command;

/// Result type alias using RfxError
pub type Result<T> = std::result::Result<T, RfxError>;

/// Unified error type for rfx operations
#[derive(Debug, Error)]
pub enum RfxError {
    // -------------------------------------------------------------------------
    // Local Resource Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Transport error on {peer}: {source}")]
    Transport {
        peer: String,
        #[source]
        source: io::Error,
    },

    #[error("{peer} is closed")]
    PeerClosed { peer: String },

    #[error("{peer} declared a {declared} byte payload (max {max})")]
    OversizedFrame { peer: String, declared: u32, max: u32 },

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("sent {request}, server did not return {expected} (got {got})")]
    UnexpectedResponse {
        request: Command,
        expected: Command,
        got: Command,
    },

    #[error("{request} failed: {}", os_error_text(.code))]
    Nak { request: Command, code: u32 },

    #[error("Filename of {len} bytes does not fit the header (max {max})")]
    FilenameTooLong { len: usize, max: usize },

    #[error("Payload too large: {len} bytes (max {max})")]
    PayloadTooLarge { len: u64, max: u32 },

    // -------------------------------------------------------------------------
    // Configuration / Usage Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Usage(String),
}

fn os_error_text(code: &u32) -> io::Error {
    io::Error::from_raw_os_error(*code as i32)
}

impl RfxError {
    /// Wrap a socket-level failure with the connection it happened on.
    pub fn transport(peer: impl Into<String>, source: io::Error) -> Self {
        RfxError::Transport {
            peer: peer.into(),
            source,
        }
    }

    /// True when the connection can no longer be used.
    ///
    /// Transport failures, a peer hang-up and an oversized declared payload
    /// all leave the byte stream out of sync with the frame boundaries.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RfxError::Transport { .. } | RfxError::PeerClosed { .. } | RfxError::OversizedFrame { .. }
        )
    }
}
