//! # rfx
//!
//! Remote file exchange: a client lists, uploads, downloads and removes
//! files on a server over one persistent TCP connection, every message
//! framed by a fixed-size binary header.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────┐            ┌──────────────────────────────┐
//! │  rfx-cli                 │            │  rfx-server                  │
//! │  Session (line loop)     │            │  Server (accept loop)        │
//! │        │                 │            │    │            │            │
//! │        ▼                 │            │    ▼            ▼            │
//! │  Client (round trips)    │            │  Worker ...  Reaper          │
//! │        │                 │            │    │  (one per connection)   │
//! │        ▼                 │    TCP     │    ▼                         │
//! │  Connection + framing ◄──┼────────────┼──► Connection + framing      │
//! └──────────────────────────┘            │    │                         │
//!                                         │    ▼                         │
//!                                         │  FileStore (fs + listing)    │
//!                                         └──────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod storage;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, RfxError};
pub use config::Config;
pub use client::Client;
pub use network::Server;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of rfx
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
