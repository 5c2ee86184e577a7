//! TCP Server
//!
//! Accepts connections and hands each one to its own worker thread.

use std::net::SocketAddr;
use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::storage::FileStore;
use super::{Listener, Reaper, Worker};

/// TCP server for rfx
pub struct Server {
    config: Config,
    listener: Listener,
    store: Arc<dyn FileStore>,
    reaper: Arc<Reaper>,
}

impl Server {
    /// Bind the configured port and start the reaper
    ///
    /// Failing to bind or listen is fatal to the server.
    pub fn bind(config: Config, store: Arc<dyn FileStore>) -> Result<Self> {
        config.validate()?;
        let listener = Listener::bind(&config)?;
        let reaper = Reaper::start()?;

        Ok(Self {
            config,
            listener,
            store,
            reaper,
        })
    }

    /// Address actually bound
    pub fn local_addr(&self) -> SocketAddr {
        self.listener.local_addr()
    }

    /// Handle on the worker table
    pub fn reaper(&self) -> Arc<Reaper> {
        Arc::clone(&self.reaper)
    }

    /// Accept connections forever (blocking)
    ///
    /// Returns only when `accept` fails with something other than an
    /// interruption.
    pub fn run(&self) -> Result<()> {
        let _span = tracing::info_span!("rfx-server").entered();

        loop {
            tracing::info!("accepting on {}", self.listener.local_addr());
            let mut conn = self.listener.accept()?;
            tracing::info!("accepted {}", conn.peer_addr());

            if let Err(e) = conn.set_timeouts(self.config.read_timeout_ms, self.config.write_timeout_ms) {
                tracing::warn!("dropping {}: {}", conn.peer_addr(), e);
                continue;
            }

            let store = Arc::clone(&self.store);
            let max_payload = self.config.max_payload_size;
            let peer = conn.peer_addr().to_string();

            let spawned = self.reaper.spawn(move |id| {
                let _span = tracing::info_span!("worker", id, peer = %peer).entered();
                // Errors are logged by the worker; the connection is already closed
                let _ = Worker::new(id, conn, store, max_payload).run();
            });

            match spawned {
                Ok(id) => tracing::debug!("worker {} serving connection", id),
                Err(e) => tracing::error!("failed to start worker: {}", e),
            }
            self.reaper.reap();
        }
    }
}
