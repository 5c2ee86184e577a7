//! Local filesystem store
//!
//! Serves files from a single root directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::Config;
use super::{FileStore, ListingCommand};

/// `FileStore` backed by a directory on this host
#[derive(Debug, Clone)]
pub struct LocalStore {
    /// Directory request names resolve against
    root: PathBuf,

    /// Program run for LS
    listing: ListingCommand,
}

impl LocalStore {
    /// Create a store serving `root`
    pub fn new(root: impl Into<PathBuf>, listing: ListingCommand) -> Self {
        Self {
            root: root.into(),
            listing,
        }
    }

    /// Create a store from the server configuration
    pub fn from_config(config: &Config) -> io::Result<Self> {
        let listing = ListingCommand::new(&config.listing_command)?;
        Ok(Self::new(&config.root_dir, listing))
    }

    /// The served directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl FileStore for LocalStore {
    fn list(&self) -> io::Result<Vec<u8>> {
        self.listing.run(&self.root)
    }

    fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(name))
    }

    fn write(&self, name: &str, data: &[u8]) -> io::Result<()> {
        fs::write(self.resolve(name), data)
    }

    fn remove(&self, name: &str) -> io::Result<()> {
        fs::remove_file(self.resolve(name))
    }
}
