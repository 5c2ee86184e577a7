//! Listening Socket
//!
//! Binds the configured port and produces accepted connections.

use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener};

use crate::config::Config;
use crate::error::{Result, RfxError};
use super::Connection;

/// The server's listening socket
pub struct Listener {
    listener: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind `config.host:config.port` and start listening
    pub fn bind(config: &Config) -> Result<Self> {
        let addr = config.server_addr();
        let listener = TcpListener::bind(&addr).map_err(|e| RfxError::transport(addr.as_str(), e))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| RfxError::transport(addr.as_str(), e))?;

        tracing::info!("listening on {}", local_addr);
        Ok(Self {
            listener,
            local_addr,
        })
    }

    /// Block until a peer connects
    ///
    /// An interrupted accept is retried; any other failure is returned and
    /// is fatal to the accept loop.
    pub fn accept(&self) -> Result<Connection> {
        loop {
            match self.listener.accept() {
                Ok((stream, peer)) => match Connection::from_stream(stream) {
                    Ok(conn) => return Ok(conn),
                    // One bad socket must not stop the accept loop
                    Err(e) => tracing::warn!("dropping connection from {}: {}", peer, e),
                },
                Err(e) if e.kind() == ErrorKind::Interrupted => {
                    tracing::debug!("accept on {} interrupted, retrying", self.local_addr);
                }
                Err(e) => return Err(RfxError::transport(self.local_addr.to_string(), e)),
            }
        }
    }

    /// The bound address (useful when binding port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }
}
