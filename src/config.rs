//! Configuration for rfx
//!
//! Centralized configuration with sensible defaults, shared by the server
//! and the client binaries.

use std::path::PathBuf;

use crate::error::{Result, RfxError};

/// Environment variable consulted when no host argument is given
pub const HOST_ENV: &str = "RFX_SERVER_HOST";

/// Environment variable consulted when no port argument is given
pub const PORT_ENV: &str = "RFX_SERVER_PORT";

/// Default upper bound for any payload sized from a received header (64 MB)
pub const DEFAULT_MAX_PAYLOAD: u32 = 64 * 1024 * 1024;

/// Main configuration for an rfx client or server
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// Server host name (client side) or bind address (server side)
    pub host: String,

    /// TCP port
    pub port: u16,

    /// Connection read timeout (milliseconds, 0 = block forever)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 = block forever)
    pub write_timeout_ms: u64,

    // -------------------------------------------------------------------------
    // Protocol Configuration
    // -------------------------------------------------------------------------
    /// Largest `nbytes` accepted before allocating a payload buffer
    pub max_payload_size: u32,

    // -------------------------------------------------------------------------
    // Server Storage Configuration
    // -------------------------------------------------------------------------
    /// Directory served by the server; request filenames resolve against it
    pub root_dir: PathBuf,

    /// Program and arguments producing the LS listing, run inside `root_dir`
    pub listing_command: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 0,
            read_timeout_ms: 0,
            write_timeout_ms: 0,
            max_payload_size: DEFAULT_MAX_PAYLOAD,
            root_dir: PathBuf::from("."),
            listing_command: vec!["ls".to_string(), "-l".to_string()],
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// `host:port` as handed to the resolver
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Reject settings no connection could work with
    pub fn validate(&self) -> Result<()> {
        if self.host.is_empty() {
            return Err(RfxError::Config("host must not be empty".to_string()));
        }
        if self.max_payload_size == 0 {
            return Err(RfxError::Config(
                "max payload size must be greater than zero".to_string(),
            ));
        }
        if self.listing_command.is_empty() {
            return Err(RfxError::Config(
                "listing command must name a program".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the server host
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the TCP port
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    /// Set the payload size bound (in bytes)
    pub fn max_payload_size(mut self, bytes: u32) -> Self {
        self.config.max_payload_size = bytes;
        self
    }

    /// Set the directory served by the server
    pub fn root_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.root_dir = path.into();
        self
    }

    /// Set the listing program and its arguments
    pub fn listing_command<I, S>(mut self, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.listing_command = command.into_iter().map(Into::into).collect();
        self
    }

    /// Apply client `[host] [port]` arguments
    ///
    /// A lone argument is the port. Whatever is not given falls back to
    /// `env_host` / `env_port` (the `HOST_ENV` / `PORT_ENV` values); the host
    /// then defaults to localhost, while a port is required.
    pub fn endpoint_args(
        mut self,
        args: &[String],
        env_host: Option<String>,
        env_port: Option<String>,
    ) -> Result<Self> {
        let (host, port) = match args {
            [] => (env_host, env_port),
            [port] => (env_host, Some(port.clone())),
            [host, port] => (Some(host.clone()), Some(port.clone())),
            _ => {
                return Err(RfxError::Usage(
                    "usage: rfx-cli [host] [port]".to_string(),
                ))
            }
        };

        let port = port.ok_or_else(|| {
            RfxError::Config(format!("no port given: pass one or set {}", PORT_ENV))
        })?;
        self.config.port = port
            .parse::<u16>()
            .map_err(|_| RfxError::Config(format!("invalid port: {}", port)))?;
        if let Some(host) = host {
            self.config.host = host;
        }
        Ok(self)
    }

    pub fn build(self) -> Config {
        self.config
    }
}
