//! Connection Worker
//!
//! Serves one accepted connection: waits for a request header, performs the
//! local action, answers, and waits again until the peer hangs up.

use std::io;
use std::sync::Arc;

use crate::error::{Result, RfxError};
use crate::protocol::{Command, Header};
use crate::storage::FileStore;
use super::Connection;

/// Identifier assigned to each worker by the accept loop
pub type WorkerId = u64;

/// Per-connection request loop
pub struct Worker {
    id: WorkerId,

    /// Owned exclusively; closed when the worker finishes
    conn: Connection,

    /// Shared filesystem access
    store: Arc<dyn FileStore>,

    /// Bound for PUT payloads and GET replies
    max_payload: u32,
}

impl Worker {
    pub fn new(id: WorkerId, conn: Connection, store: Arc<dyn FileStore>, max_payload: u32) -> Self {
        Self {
            id,
            conn,
            store,
            max_payload,
        }
    }

    /// Serve requests until the peer closes or the transport fails
    ///
    /// A peer hang-up between requests is a normal end and returns `Ok`.
    pub fn run(mut self) -> Result<()> {
        tracing::info!("worker {} connected to {}", self.id, self.conn.peer_addr());

        let result = self.serve();
        self.conn.close();

        match result {
            Err(RfxError::PeerClosed { .. }) => {
                tracing::info!("{} disconnected", self.conn.peer_addr());
                Ok(())
            }
            Err(e) => {
                tracing::warn!("closing {}: {}", self.conn.peer_addr(), e);
                Err(e)
            }
            Ok(()) => Ok(()),
        }
    }

    fn serve(&mut self) -> Result<()> {
        loop {
            tracing::trace!("waiting to receive header");
            let header = match self.conn.recv_header() {
                Ok(header) => header,
                // Unknown command code: drop the header and keep serving
                Err(RfxError::Protocol(msg)) => {
                    tracing::warn!("invalid client header: {}", msg);
                    continue;
                }
                Err(e) => return Err(e),
            };

            match header.command {
                Command::Ls => self.reply_ls()?,
                Command::Put => self.reply_put(&header)?,
                Command::Get => self.reply_get(&header)?,
                Command::Rm => self.reply_rm(&header)?,
                _ => tracing::warn!("invalid client header: {}", header),
            }
        }
    }

    // =========================================================================
    // Request handlers
    // =========================================================================

    fn reply_ls(&mut self) -> Result<()> {
        match self.store.list() {
            Ok(listing) => match u32::try_from(listing.len()) {
                Ok(len) if len <= self.max_payload => {
                    self.conn.send_frame(&Header::payload(Command::LsOut, len), &listing)
                }
                _ => self.send_nak("ls", &io::Error::from_raw_os_error(libc::EFBIG)),
            },
            Err(e) => self.send_nak("ls", &e),
        }
    }

    fn reply_put(&mut self, header: &Header) -> Result<()> {
        // Always drain the payload so the stream stays on a frame boundary,
        // even when the filename is unusable
        let data = self.conn.recv_payload(header.nbytes, self.max_payload)?;

        let name = match header.filename() {
            Ok(name) if !name.is_empty() => name,
            _ => return self.send_nak("put", &io::Error::from_raw_os_error(libc::EINVAL)),
        };

        match self.store.write(name, &data) {
            Ok(()) => {
                tracing::info!("wrote {} bytes to {}", data.len(), name);
                self.conn.send_header(&Header::ack())
            }
            Err(e) => self.send_nak(name, &e),
        }
    }

    fn reply_get(&mut self, header: &Header) -> Result<()> {
        let name = match header.filename() {
            Ok(name) if !name.is_empty() => name,
            _ => return self.send_nak("get", &io::Error::from_raw_os_error(libc::EINVAL)),
        };

        let data = match self.store.read(name) {
            Ok(data) => data,
            Err(e) => return self.send_nak(name, &e),
        };

        match u32::try_from(data.len()) {
            Ok(len) if len <= self.max_payload => {
                tracing::info!("read {} bytes from {}", len, name);
                self.conn.send_frame(&Header::payload(Command::FileOut, len), &data)
            }
            _ => self.send_nak(name, &io::Error::from_raw_os_error(libc::EFBIG)),
        }
    }

    fn reply_rm(&mut self, header: &Header) -> Result<()> {
        let name = match header.filename() {
            Ok(name) if !name.is_empty() => name,
            _ => return self.send_nak("rm", &io::Error::from_raw_os_error(libc::EINVAL)),
        };

        match self.store.remove(name) {
            Ok(()) => {
                tracing::info!("removed {}", name);
                self.conn.send_header(&Header::ack())
            }
            Err(e) => self.send_nak(name, &e),
        }
    }

    /// Report a local failure to the client; the connection stays up
    fn send_nak(&mut self, subject: &str, err: &io::Error) -> Result<()> {
        tracing::warn!("{}: {}", subject, err);
        let code = err.raw_os_error().unwrap_or(libc::EIO);
        self.conn.send_header(&Header::nak(code as u32))
    }
}
