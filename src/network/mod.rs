//! Network Module
//!
//! TCP server and client connection handling.
//!
//! ## Architecture
//! - Single acceptor thread owning the listening socket
//! - One worker thread per accepted connection
//! - Finished workers reclaimed by the reaper, both right after each spawn
//!   and when a worker signals completion

pub mod framing;
mod connection;
mod listener;
mod reaper;
mod server;
mod worker;

pub use connection::Connection;
pub use framing::{recv_all, send_all};
pub use listener::Listener;
pub use reaper::Reaper;
pub use server::Server;
pub use worker::{Worker, WorkerId};
