//! Storage Module
//!
//! The server's view of the local filesystem.
//!
//! ## Responsibilities
//! - Produce the directory listing sent for LS
//! - Read, write and delete the files named in PUT / GET / RM
//!
//! Every operation returns `io::Result` so the OS error number survives
//! into the NAK header sent back to the client.

mod local;
mod listing;

use std::io;

pub use local::LocalStore;
pub use listing::ListingCommand;

/// Filesystem operations performed on behalf of a connected client
///
/// Implementations are shared by every worker and perform no locking;
/// concurrent writers to the same name race at the filesystem.
pub trait FileStore: Send + Sync {
    /// Text of the directory listing
    fn list(&self) -> io::Result<Vec<u8>>;

    /// Entire contents of `name`
    fn read(&self, name: &str) -> io::Result<Vec<u8>>;

    /// Replace `name` with `data`
    fn write(&self, name: &str, data: &[u8]) -> io::Result<()>;

    /// Delete `name`
    fn remove(&self, name: &str) -> io::Result<()>;
}
