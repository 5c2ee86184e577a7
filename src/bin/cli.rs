//! rfx CLI Client
//!
//! Interactive client: one command per line on stdin.

use std::env;
use std::io;

use clap::Parser;
use rfx::client::Session;
use rfx::config::{Config, DEFAULT_MAX_PAYLOAD, HOST_ENV, PORT_ENV};
use rfx::Client;
use tracing_subscriber::{fmt, EnvFilter};

/// rfx CLI
#[derive(Parser, Debug)]
#[command(name = "rfx-cli")]
#[command(about = "Client for the rfx remote file exchange server")]
#[command(version)]
struct Args {
    /// `[host] [port]`; a lone argument is the port. Falls back to
    /// RFX_SERVER_HOST / RFX_SERVER_PORT, host defaulting to localhost
    #[arg(num_args = 0..=2, value_name = "ENDPOINT")]
    endpoint: Vec<String>,

    /// Largest payload accepted or sent, in bytes
    #[arg(short = 'm', long, default_value_t = DEFAULT_MAX_PAYLOAD)]
    max_payload: u32,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rfx=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let _span = tracing::info_span!("rfx-cli").entered();
    tracing::info!("starting rfx CLI v{}", rfx::VERSION);

    let builder = Config::builder().endpoint_args(
        &args.endpoint,
        env::var(HOST_ENV).ok(),
        env::var(PORT_ENV).ok(),
    );
    let config = match builder {
        Ok(builder) => builder.max_payload_size(args.max_payload).build(),
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let client = match Client::connect(&config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let stdin = io::stdin();
    let mut session = Session::new(client, stdin.lock(), io::stdout());
    let status = match session.run() {
        Ok(()) => 0,
        Err(e) => {
            tracing::error!("session ended: {}", e);
            1
        }
    };

    tracing::info!("finishing");
    std::process::exit(status);
}
