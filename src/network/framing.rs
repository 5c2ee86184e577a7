//! Framing primitives
//!
//! Guaranteed-complete transfers over a byte stream whose individual
//! reads and writes may move fewer bytes than asked for.

use std::io::{self, ErrorKind, Read, Write};

use crate::error::{Result, RfxError};

/// Write all of `buf`, resuming after every partial write
///
/// A write that accepts zero bytes, or any I/O failure, is reported as a
/// transport error on `peer`. Interrupted writes are not retried here.
pub fn send_all<W: Write + ?Sized>(stream: &mut W, peer: &str, buf: &[u8]) -> Result<()> {
    let mut sent = 0;
    while sent < buf.len() {
        match stream.write(&buf[sent..]) {
            Ok(0) => {
                return Err(RfxError::transport(
                    peer,
                    io::Error::new(ErrorKind::WriteZero, "transport accepted no bytes"),
                ))
            }
            Ok(n) => sent += n,
            Err(e) => return Err(RfxError::transport(peer, e)),
        }
    }
    stream.flush().map_err(|e| RfxError::transport(peer, e))
}

/// Fill all of `buf`, resuming after every partial read
///
/// A zero-length read means the peer hung up before the declared bytes
/// arrived and yields `PeerClosed`; any other failure is a transport error.
pub fn recv_all<R: Read + ?Sized>(stream: &mut R, peer: &str, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match stream.read(&mut buf[filled..]) {
            Ok(0) => {
                return Err(RfxError::PeerClosed {
                    peer: peer.to_string(),
                })
            }
            Ok(n) => filled += n,
            Err(e) => return Err(RfxError::transport(peer, e)),
        }
    }
    Ok(())
}
