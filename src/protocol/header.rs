//! Header definition
//!
//! The fixed-size record that precedes every payload on the wire.

use std::fmt;

use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Result, RfxError};
use super::Command;

/// Capacity of the filename field, NUL terminator included
pub const FILENAME_SIZE: usize = 59;

/// Encoded header size: command (1) + nbytes (4) + filename (59)
pub const HEADER_SIZE: usize = 1 + 4 + FILENAME_SIZE;

/// A decoded header, `nbytes` held in host order
#[derive(Clone, PartialEq, Eq)]
pub struct Header {
    /// Request or response kind
    pub command: Command,

    /// Payload length, or the OS error number of a NAK
    pub nbytes: u32,

    /// NUL-padded subject path; all zero when unused
    filename: [u8; FILENAME_SIZE],
}

impl Header {
    /// A header with no payload and no filename
    pub fn new(command: Command) -> Self {
        Self {
            command,
            nbytes: 0,
            filename: [0u8; FILENAME_SIZE],
        }
    }

    /// A header naming a file
    ///
    /// Fails instead of truncating when `name` (plus its terminator) does not
    /// fit the field.
    pub fn with_filename(command: Command, name: &str) -> Result<Self> {
        let bytes = name.as_bytes();
        if bytes.len() >= FILENAME_SIZE {
            return Err(RfxError::FilenameTooLong {
                len: bytes.len(),
                max: FILENAME_SIZE - 1,
            });
        }
        if bytes.contains(&0) {
            return Err(RfxError::Protocol(format!(
                "Filename {:?} contains a NUL byte",
                name
            )));
        }

        let mut header = Self::new(command);
        header.filename[..bytes.len()].copy_from_slice(bytes);
        Ok(header)
    }

    /// A header announcing `len` payload bytes
    pub fn payload(command: Command, len: u32) -> Self {
        Self {
            nbytes: len,
            ..Self::new(command)
        }
    }

    /// Positive acknowledgement
    pub fn ack() -> Self {
        Self::new(Command::Ack)
    }

    /// Negative acknowledgement carrying an OS error number
    pub fn nak(code: u32) -> Self {
        Self::payload(Command::Nak, code)
    }

    /// Set the payload length
    pub fn with_nbytes(mut self, nbytes: u32) -> Self {
        self.nbytes = nbytes;
        self
    }

    /// Filename bytes up to the terminator
    pub fn filename_bytes(&self) -> &[u8] {
        let end = self
            .filename
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(FILENAME_SIZE);
        &self.filename[..end]
    }

    /// Filename as text
    ///
    /// Fails when the field has no terminator or the name is not UTF-8.
    pub fn filename(&self) -> Result<&str> {
        if !self.filename.contains(&0) {
            return Err(RfxError::Protocol(
                "Filename field is not NUL-terminated".to_string(),
            ));
        }
        std::str::from_utf8(self.filename_bytes())
            .map_err(|e| RfxError::Protocol(format!("Filename is not valid UTF-8: {}", e)))
    }

    /// Raw filename field, padding included
    pub fn filename_field(&self) -> &[u8; FILENAME_SIZE] {
        &self.filename
    }
}

// =============================================================================
// Encoding/Decoding
// =============================================================================

/// Encode a header to its fixed wire layout
///
/// Format: command (1) + nbytes (4, big endian) + filename (59)
pub fn encode_header(header: &Header) -> [u8; HEADER_SIZE] {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE);
    buf.put_u8(header.command.code());
    buf.put_u32(header.nbytes);
    buf.put_slice(&header.filename);

    let mut out = [0u8; HEADER_SIZE];
    out.copy_from_slice(&buf);
    out
}

/// Decode a header from exactly `HEADER_SIZE` bytes
///
/// Only the length and the command code are checked here. The filename
/// field is kept as received and validated by `Header::filename`, so a
/// request with a bad name still yields its `nbytes`.
pub fn decode_header(bytes: &[u8]) -> Result<Header> {
    if bytes.len() != HEADER_SIZE {
        return Err(RfxError::Protocol(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    let mut buf = bytes;
    let command = Command::try_from(buf.get_u8())?;
    let nbytes = buf.get_u32();

    let mut filename = [0u8; FILENAME_SIZE];
    buf.copy_to_slice(&mut filename);

    Ok(Header {
        command,
        nbytes,
        filename,
    })
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{},{}({}),\"{}\"}}",
            self.nbytes,
            self.command.code(),
            self.command,
            String::from_utf8_lossy(self.filename_bytes())
        )
    }
}

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
