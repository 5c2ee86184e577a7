//! rfx Server Binary
//!
//! Serves a directory to rfx clients.

use std::sync::Arc;

use clap::Parser;
use rfx::config::{Config, DEFAULT_MAX_PAYLOAD, PORT_ENV};
use rfx::storage::LocalStore;
use rfx::Server;
use tracing_subscriber::{fmt, EnvFilter};

/// rfx Server
#[derive(Parser, Debug)]
#[command(name = "rfx-server")]
#[command(about = "Remote file exchange server")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(env = PORT_ENV)]
    port: u16,

    /// Address to bind
    #[arg(short = 'b', long, default_value = "0.0.0.0")]
    bind: String,

    /// Directory to serve
    #[arg(short, long, default_value = ".")]
    root: String,

    /// Largest payload accepted or sent, in bytes
    #[arg(short = 'm', long, default_value_t = DEFAULT_MAX_PAYLOAD)]
    max_payload: u32,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rfx=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("rfx server v{}", rfx::VERSION);
    tracing::info!("Serving directory: {}", args.root);

    // Build config from args
    let config = Config::builder()
        .host(&args.bind)
        .port(args.port)
        .root_dir(&args.root)
        .max_payload_size(args.max_payload)
        .build();

    let store = match LocalStore::from_config(&config) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to set up storage: {}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::bind(config, store) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
