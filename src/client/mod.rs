//! Client Module
//!
//! Client side of the command protocol: one blocking round trip per
//! request, plus the line-oriented session loop driving it.
//!
//! ## State
//! `IDLE → AWAIT_RESPONSE → IDLE`; nothing is carried between commands
//! except the open connection.

pub mod session;

use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::error::{Result, RfxError};
use crate::network::Connection;
use crate::protocol::{Command, Header};

pub use session::{parse_line, Session, UserCommand, HELP};

/// A connected rfx client
pub struct Client {
    conn: Connection,

    /// Bound for LSOUT / FILEOUT payloads and outgoing PUTs
    max_payload: u32,
}

impl Client {
    /// Connect to `config.host:config.port`
    pub fn connect(config: &Config) -> Result<Self> {
        config.validate()?;
        let addr = config.server_addr();
        tracing::info!("connecting to {}", addr);

        let mut conn = Connection::connect(addr.as_str())?;
        conn.set_timeouts(config.read_timeout_ms, config.write_timeout_ms)?;
        tracing::info!("connected to {}", conn.peer_addr());

        Ok(Self::new(conn, config.max_payload_size))
    }

    /// Use an already established connection
    pub fn new(conn: Connection, max_payload: u32) -> Self {
        Self { conn, max_payload }
    }

    /// The server's address
    pub fn peer_addr(&self) -> &str {
        self.conn.peer_addr()
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Fetch the server's directory listing
    pub fn ls(&mut self) -> Result<Vec<u8>> {
        let reply = self.round_trip(&Header::new(Command::Ls), &[])?;
        self.conn.recv_payload(reply.nbytes, self.max_payload)
    }

    /// Upload the local file `local` as `remote`
    ///
    /// The file is read fully before anything is sent; a local read failure
    /// sends nothing. Returns the number of bytes uploaded.
    pub fn put(&mut self, local: &Path, remote: &str) -> Result<u64> {
        let data = fs::read(local)?;
        tracing::debug!("read {} bytes from {}", data.len(), local.display());
        self.put_bytes(remote, &data)?;
        Ok(data.len() as u64)
    }

    /// Upload `data` as `remote`
    pub fn put_bytes(&mut self, remote: &str, data: &[u8]) -> Result<()> {
        let len = match u32::try_from(data.len()) {
            Ok(len) if len <= self.max_payload => len,
            _ => {
                return Err(RfxError::PayloadTooLarge {
                    len: data.len() as u64,
                    max: self.max_payload,
                })
            }
        };

        let header = Header::with_filename(Command::Put, remote)?.with_nbytes(len);
        self.round_trip(&header, data)?;
        Ok(())
    }

    /// Download `remote` into the local file `local`
    ///
    /// Returns the number of bytes written.
    pub fn get(&mut self, remote: &str, local: &Path) -> Result<u64> {
        let data = self.get_bytes(remote)?;
        fs::write(local, &data)?;
        tracing::debug!("wrote {} bytes to {}", data.len(), local.display());
        Ok(data.len() as u64)
    }

    /// Download `remote` into memory
    pub fn get_bytes(&mut self, remote: &str) -> Result<Vec<u8>> {
        let reply = self.round_trip(&Header::with_filename(Command::Get, remote)?, &[])?;
        self.conn.recv_payload(reply.nbytes, self.max_payload)
    }

    /// Delete `remote` on the server
    pub fn rm(&mut self, remote: &str) -> Result<()> {
        self.round_trip(&Header::with_filename(Command::Rm, remote)?, &[])?;
        Ok(())
    }

    /// Close the connection
    pub fn close(&mut self) {
        self.conn.close();
    }

    /// Send one request and wait for its response header
    ///
    /// Any response other than the request's success command is returned as
    /// an error and its payload, if any, is never read.
    fn round_trip(&mut self, request: &Header, payload: &[u8]) -> Result<Header> {
        let expected = request.command.success_response().ok_or_else(|| {
            RfxError::Protocol(format!("{} is not a network request", request.command))
        })?;

        self.conn.send_frame(request, payload)?;
        let reply = self.conn.recv_header()?;

        if reply.command == expected {
            return Ok(reply);
        }
        if reply.command == Command::Nak {
            return Err(RfxError::Nak {
                request: request.command,
                code: reply.nbytes,
            });
        }
        Err(RfxError::UnexpectedResponse {
            request: request.command,
            expected,
            got: reply.command,
        })
    }
}
