//! Tests for the worker Reaper
//!
//! These tests verify:
//! - Finished workers are reclaimed without an explicit reap call
//! - `reap()` never waits on a running worker
//! - Panicking workers are reclaimed too
//! - Many short connections against a server all get reclaimed

use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam::channel::unbounded;
use rfx::network::{Connection, Reaper};
use rfx::protocol::{Command, Header};
use rfx::storage::LocalStore;
use rfx::{Config, Server};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

/// Poll `cond` until it holds or `timeout` passes
fn eventually(timeout: Duration, cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    cond()
}

fn start_server(root: &TempDir) -> (SocketAddr, Arc<Reaper>) {
    let config = Config::builder()
        .host("127.0.0.1")
        .port(0)
        .root_dir(root.path())
        .build();
    let store = Arc::new(LocalStore::from_config(&config).unwrap());
    let server = Server::bind(config, store).unwrap();
    let addr = server.local_addr();
    let reaper = server.reaper();
    thread::spawn(move || {
        let _ = server.run();
    });
    (addr, reaper)
}

// =============================================================================
// Reaper Tests
// =============================================================================

#[test]
fn test_finished_workers_are_reclaimed_by_notification() {
    let reaper = Reaper::start().unwrap();

    for _ in 0..20 {
        reaper.spawn(|_| {}).unwrap();
    }

    // No explicit reap: the notifier alone must drain the table
    assert!(eventually(Duration::from_secs(5), || reaper.active() == 0));
}

#[test]
fn test_reap_does_not_wait_for_running_worker() {
    let reaper = Reaper::start().unwrap();
    let (release_tx, release_rx) = unbounded::<()>();

    reaper
        .spawn(move |_| {
            let _ = release_rx.recv();
        })
        .unwrap();

    let started = Instant::now();
    assert_eq!(reaper.reap(), 0);
    assert!(started.elapsed() < Duration::from_secs(1));
    assert_eq!(reaper.active(), 1);

    release_tx.send(()).unwrap();
    assert!(eventually(Duration::from_secs(5), || reaper.active() == 0));
}

#[test]
fn test_panicking_worker_is_reclaimed() {
    let reaper = Reaper::start().unwrap();

    reaper.spawn(|_| panic!("worker blew up")).unwrap();

    assert!(eventually(Duration::from_secs(5), || reaper.active() == 0));
}

#[test]
fn test_worker_ids_are_unique() {
    let reaper = Reaper::start().unwrap();
    let (id_tx, id_rx) = unbounded();

    let mut spawned = Vec::new();
    for _ in 0..10 {
        let id_tx = id_tx.clone();
        spawned.push(reaper.spawn(move |id| id_tx.send(id).unwrap()).unwrap());
    }
    drop(id_tx);

    let mut seen: Vec<_> = id_rx.iter().collect();
    seen.sort_unstable();
    spawned.sort_unstable();
    assert_eq!(seen, spawned);
    spawned.dedup();
    assert_eq!(spawned.len(), 10);
}

#[test]
fn test_reap_racing_completion_still_reclaims() {
    let reaper = Reaper::start().unwrap();

    // Hammer reap() from another thread while workers signal and exit, then
    // stop: whatever it missed must still be collected by the notifier
    for _ in 0..200 {
        let racer = {
            let reaper = Arc::clone(&reaper);
            thread::spawn(move || {
                for _ in 0..50 {
                    reaper.reap();
                }
            })
        };
        reaper.spawn(|_| {}).unwrap();
        racer.join().unwrap();
    }

    assert!(eventually(Duration::from_secs(5), || reaper.active() == 0));
}

#[test]
fn test_repeated_reap_is_idempotent() {
    let reaper = Reaper::start().unwrap();
    reaper.spawn(|_| {}).unwrap();

    assert!(eventually(Duration::from_secs(5), || reaper.active() == 0));
    assert_eq!(reaper.reap(), 0);
    assert_eq!(reaper.reap(), 0);
}

// =============================================================================
// Server Liveness Tests
// =============================================================================

#[test]
fn test_short_connections_are_all_reclaimed() {
    let root = TempDir::new().unwrap();
    let (addr, reaper) = start_server(&root);

    for _ in 0..50 {
        let conn = Connection::connect(&addr).unwrap();
        drop(conn);
    }

    assert!(eventually(Duration::from_secs(10), || reaper.active() == 0));
}

#[test]
fn test_workers_live_while_clients_connected() {
    let root = TempDir::new().unwrap();
    let (addr, reaper) = start_server(&root);

    let mut conns: Vec<Connection> = (0..5)
        .map(|_| Connection::connect(&addr).unwrap())
        .collect();

    // A round trip on each proves its worker is up
    for conn in &mut conns {
        conn.send_header(&Header::with_filename(Command::Rm, "missing").unwrap())
            .unwrap();
        assert_eq!(conn.recv_header().unwrap().command, Command::Nak);
    }
    assert_eq!(reaper.active(), 5);

    drop(conns);
    assert!(eventually(Duration::from_secs(10), || reaper.active() == 0));
}
