//! Tests for LocalStore and the listing facility
//!
//! These tests verify:
//! - File operations resolve against the served root
//! - Failures keep their OS error number
//! - Listing output capture (stdout and stderr, non-zero exits)

use std::io::ErrorKind;
use std::path::PathBuf;

use rfx::storage::{FileStore, ListingCommand, LocalStore};
use rfx::Config;
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn argv(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

fn setup_store() -> (TempDir, LocalStore) {
    let temp_dir = TempDir::new().unwrap();
    let listing = ListingCommand::new(&argv(&["ls", "-l"])).unwrap();
    let store = LocalStore::new(temp_dir.path(), listing);
    (temp_dir, store)
}

// =============================================================================
// File Operation Tests
// =============================================================================

#[test]
fn test_write_read_remove() {
    let (temp, store) = setup_store();

    store.write("a.txt", b"contents").unwrap();
    assert_eq!(std::fs::read(temp.path().join("a.txt")).unwrap(), b"contents");
    assert_eq!(store.read("a.txt").unwrap(), b"contents");

    store.remove("a.txt").unwrap();
    assert!(!temp.path().join("a.txt").exists());
}

#[test]
fn test_missing_file_errors_carry_errno() {
    let (_temp, store) = setup_store();

    let err = store.read("missing").unwrap_err();
    assert_eq!(err.raw_os_error(), Some(libc::ENOENT));

    let err = store.remove("missing").unwrap_err();
    assert_eq!(err.raw_os_error(), Some(libc::ENOENT));
}

#[test]
fn test_read_directory_fails() {
    let (temp, store) = setup_store();
    std::fs::create_dir(temp.path().join("sub")).unwrap();

    let err = store.read("sub").unwrap_err();
    assert_eq!(err.raw_os_error(), Some(libc::EISDIR));
}

#[test]
fn test_from_config_uses_root() {
    let temp = TempDir::new().unwrap();
    let config = Config::builder().root_dir(temp.path()).build();
    let store = LocalStore::from_config(&config).unwrap();

    assert_eq!(store.root(), temp.path());
    store.write("x", b"1").unwrap();
    assert!(temp.path().join("x").exists());
}

#[test]
fn test_from_config_rejects_empty_listing() {
    let config = Config::builder()
        .listing_command(Vec::<String>::new())
        .build();
    assert!(config.validate().is_err());
    assert!(LocalStore::from_config(&config).is_err());
}

// =============================================================================
// Listing Tests
// =============================================================================

#[test]
fn test_listing_runs_in_root() {
    let (temp, store) = setup_store();
    std::fs::write(temp.path().join("listed-file"), b"").unwrap();

    let listing = String::from_utf8(store.list().unwrap()).unwrap();
    assert!(listing.contains("listed-file"));
}

#[test]
fn test_listing_captures_stderr() {
    let listing = ListingCommand::new(&argv(&["sh", "-c", "echo out; echo err 1>&2"])).unwrap();
    let output = listing.run(&PathBuf::from(".")).unwrap();

    assert_eq!(output, b"out\nerr\n");
}

#[test]
fn test_listing_nonzero_exit_still_returns_output() {
    let listing = ListingCommand::new(&argv(&["sh", "-c", "echo partial; exit 3"])).unwrap();
    let output = listing.run(&PathBuf::from(".")).unwrap();

    assert_eq!(output, b"partial\n");
}

#[test]
fn test_listing_waits_for_child_after_stdout_ends() {
    // stdout closes first; the exit and the late stderr must still be collected
    let listing = ListingCommand::new(&argv(&[
        "sh",
        "-c",
        "echo early; exec 1>&-; sleep 0.2; echo late 1>&2",
    ]))
    .unwrap();
    let output = listing.run(&PathBuf::from(".")).unwrap();

    assert_eq!(output, b"early\nlate\n");
}

#[test]
fn test_listing_missing_program() {
    let listing = ListingCommand::new(&argv(&["rfx-definitely-not-installed"])).unwrap();
    let err = listing.run(&PathBuf::from(".")).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(err.raw_os_error(), Some(libc::ENOENT));
}

#[test]
fn test_listing_display() {
    let listing = ListingCommand::new(&argv(&["ls", "-l", "-a"])).unwrap();
    assert_eq!(listing.to_string(), "ls -l -a");
}
