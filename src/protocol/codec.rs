//! Protocol codec
//!
//! Stream-level frame I/O built on the framing primitives.
//!
//! ## Frame Format
//! ```text
//! ┌──────────┬────────────┬──────────────────────┬─────────────────────┐
//! │ Cmd (1)  │ Nbytes (4) │ Filename (59, NUL)   │ Payload (nbytes)    │
//! └──────────┴────────────┴──────────────────────┴─────────────────────┘
//! ```
//!
//! The payload is present only for PUT requests and LSOUT / FILEOUT
//! responses; for NAK, `nbytes` carries an OS error number instead.

use std::io::{Read, Write};

use crate::error::{Result, RfxError};
use crate::network::framing::{recv_all, send_all};
use super::{decode_header, encode_header, Header, HEADER_SIZE};

// =============================================================================
// Writing
// =============================================================================

/// Write a header alone
pub fn write_header<W: Write + ?Sized>(writer: &mut W, peer: &str, header: &Header) -> Result<()> {
    tracing::debug!("sending header {} to {}", header, peer);
    send_all(writer, peer, &encode_header(header))
}

/// Write a header followed by its payload
///
/// `header.nbytes` must equal `payload.len()`.
pub fn write_frame<W: Write + ?Sized>(
    writer: &mut W,
    peer: &str,
    header: &Header,
    payload: &[u8],
) -> Result<()> {
    if header.nbytes as usize != payload.len() {
        return Err(RfxError::Protocol(format!(
            "Header announces {} bytes but payload has {}",
            header.nbytes,
            payload.len()
        )));
    }

    write_header(writer, peer, header)?;
    if !payload.is_empty() {
        send_all(writer, peer, payload)?;
        tracing::debug!("sent {} bytes to {}", payload.len(), peer);
    }
    Ok(())
}

// =============================================================================
// Reading
// =============================================================================

/// Read one header
///
/// Transport and peer-closed errors mean the stream is gone. A `Protocol`
/// error means the command code is unknown: the header bytes were consumed,
/// but any payload it announced cannot be located.
pub fn read_header<R: Read + ?Sized>(reader: &mut R, peer: &str) -> Result<Header> {
    let mut bytes = [0u8; HEADER_SIZE];
    recv_all(reader, peer, &mut bytes)?;

    let header = decode_header(&bytes)?;
    tracing::debug!("received header {} from {}", header, peer);
    Ok(header)
}

/// Read the `nbytes` payload announced by a header
///
/// The declared length is checked against `max_payload` before any buffer
/// is allocated.
pub fn read_payload<R: Read + ?Sized>(
    reader: &mut R,
    peer: &str,
    nbytes: u32,
    max_payload: u32,
) -> Result<Vec<u8>> {
    if nbytes > max_payload {
        return Err(RfxError::OversizedFrame {
            peer: peer.to_string(),
            declared: nbytes,
            max: max_payload,
        });
    }

    let mut payload = vec![0u8; nbytes as usize];
    recv_all(reader, peer, &mut payload)?;
    tracing::debug!("received {} bytes from {}", nbytes, peer);
    Ok(payload)
}
