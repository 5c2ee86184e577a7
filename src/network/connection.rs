//! Connection Handle
//!
//! A bidirectional byte stream to one peer, either dialled out by the
//! client or handed over by the server's listener.

use std::io::{self, ErrorKind};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::error::{Result, RfxError};
use crate::protocol::{read_header, read_payload, write_frame, write_header, Header};
use super::framing::{recv_all, send_all};

/// A live connection to one peer
///
/// The stream is released exactly once, by `close` or on drop; calls made
/// after that fail with a `NotConnected` transport error.
pub struct Connection {
    /// TCP stream (None once closed)
    stream: Option<TcpStream>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Dial `addr` (anything resolvable, e.g. `localhost:9000`)
    pub fn connect<A: ToSocketAddrs + ?Sized>(addr: &A) -> Result<Self> {
        let stream = TcpStream::connect(addr).map_err(|e| RfxError::transport("connect", e))?;
        Self::from_stream(stream)
    }

    /// Wrap an already connected stream
    pub fn from_stream(stream: TcpStream) -> Result<Self> {
        // Get peer address for logging
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Headers are small and each one is answered, so don't batch them
        stream
            .set_nodelay(true)
            .map_err(|e| RfxError::transport(peer_addr.as_str(), e))?;

        Ok(Self {
            stream: Some(stream),
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 leaves the call blocking)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        let peer = self.peer_addr.clone();
        let stream = self.stream()?;

        if read_ms > 0 {
            stream
                .set_read_timeout(Some(Duration::from_millis(read_ms)))
                .map_err(|e| RfxError::transport(peer.as_str(), e))?;
        }
        if write_ms > 0 {
            stream
                .set_write_timeout(Some(Duration::from_millis(write_ms)))
                .map_err(|e| RfxError::transport(peer.as_str(), e))?;
        }

        Ok(())
    }

    // =========================================================================
    // Raw transfers
    // =========================================================================

    /// Send every byte of `buf`
    pub fn send_all(&mut self, buf: &[u8]) -> Result<()> {
        let peer = self.peer_addr.clone();
        send_all(self.stream()?, &peer, buf)
    }

    /// Receive exactly `buf.len()` bytes
    pub fn recv_all(&mut self, buf: &mut [u8]) -> Result<()> {
        let peer = self.peer_addr.clone();
        recv_all(self.stream()?, &peer, buf)
    }

    // =========================================================================
    // Frames
    // =========================================================================

    /// Send a header with no payload
    pub fn send_header(&mut self, header: &Header) -> Result<()> {
        let peer = self.peer_addr.clone();
        write_header(self.stream()?, &peer, header)
    }

    /// Send a header and the payload it announces
    pub fn send_frame(&mut self, header: &Header, payload: &[u8]) -> Result<()> {
        let peer = self.peer_addr.clone();
        write_frame(self.stream()?, &peer, header, payload)
    }

    /// Block until the next header arrives
    pub fn recv_header(&mut self) -> Result<Header> {
        let peer = self.peer_addr.clone();
        read_header(self.stream()?, &peer)
    }

    /// Receive an `nbytes` payload, refusing lengths above `max_payload`
    pub fn recv_payload(&mut self, nbytes: u32, max_payload: u32) -> Result<Vec<u8>> {
        let peer = self.peer_addr.clone();
        read_payload(self.stream()?, &peer, nbytes, max_payload)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Release the stream; later calls are no-ops
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            // Peer may already be gone
            let _ = stream.shutdown(Shutdown::Both);
            tracing::debug!("closed connection to {}", self.peer_addr);
        }
    }

    /// Whether `close` has run
    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    fn stream(&mut self) -> Result<&mut TcpStream> {
        match self.stream.as_mut() {
            Some(stream) => Ok(stream),
            None => Err(RfxError::transport(
                self.peer_addr.as_str(),
                io::Error::new(ErrorKind::NotConnected, "connection already closed"),
            )),
        }
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("peer_addr", &self.peer_addr)
            .field("closed", &self.is_closed())
            .finish()
    }
}
