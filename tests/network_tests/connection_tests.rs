//! Tests for Connection and Listener
//!
//! These tests verify:
//! - Outbound and accepted connections exchange frames
//! - Close is idempotent and later use fails cleanly
//! - A peer closing mid-payload is detected

use std::io::ErrorKind;
use std::net::TcpListener;
use std::thread;

use rfx::network::{Connection, Listener};
use rfx::protocol::{Command, Header};
use rfx::{Config, RfxError};

// =============================================================================
// Helper Functions
// =============================================================================

fn loopback_listener() -> Listener {
    let config = Config::builder().host("127.0.0.1").port(0).build();
    Listener::bind(&config).unwrap()
}

/// Accepted + outbound ends of one connection
fn connected_pair() -> (Connection, Connection) {
    let listener = loopback_listener();
    let addr = listener.local_addr();

    let acceptor = thread::spawn(move || listener.accept().unwrap());
    let client = Connection::connect(&addr).unwrap();
    let server = acceptor.join().unwrap();
    (client, server)
}

// =============================================================================
// Exchange Tests
// =============================================================================

#[test]
fn test_frame_exchange() {
    let (mut client, mut server) = connected_pair();

    let request = Header::with_filename(Command::Put, "up.bin").unwrap().with_nbytes(4);
    client.send_frame(&request, b"data").unwrap();

    let received = server.recv_header().unwrap();
    assert_eq!(received, request);
    assert_eq!(server.recv_payload(received.nbytes, 1024).unwrap(), b"data");

    server.send_header(&Header::ack()).unwrap();
    assert_eq!(client.recv_header().unwrap().command, Command::Ack);
}

#[test]
fn test_large_raw_transfer() {
    let (mut client, mut server) = connected_pair();
    let data: Vec<u8> = (0..4 * 1024 * 1024).map(|i| (i % 256) as u8).collect();
    let expected = data.clone();

    let sender = thread::spawn(move || {
        client.send_all(&data).unwrap();
        client
    });

    let mut buf = vec![0u8; expected.len()];
    server.recv_all(&mut buf).unwrap();
    assert_eq!(buf, expected);
    sender.join().unwrap();
}

#[test]
fn test_peer_close_mid_payload() {
    let (mut client, mut server) = connected_pair();

    client
        .send_header(&Header::payload(Command::FileOut, 1000))
        .unwrap();
    client.send_all(&[1u8; 10]).unwrap();
    client.close();

    let header = server.recv_header().unwrap();
    let result = server.recv_payload(header.nbytes, 4096);
    assert!(matches!(result, Err(RfxError::PeerClosed { .. })));
}

#[test]
fn test_peer_close_between_frames() {
    let (mut client, mut server) = connected_pair();
    client.close();

    assert!(matches!(server.recv_header(), Err(RfxError::PeerClosed { .. })));
}

// =============================================================================
// Lifecycle Tests
// =============================================================================

#[test]
fn test_double_close_is_noop() {
    let (mut client, _server) = connected_pair();

    assert!(!client.is_closed());
    client.close();
    client.close();
    assert!(client.is_closed());
}

#[test]
fn test_use_after_close_fails() {
    let (mut client, _server) = connected_pair();
    client.close();

    match client.send_header(&Header::new(Command::Ls)) {
        Err(RfxError::Transport { source, .. }) => assert_eq!(source.kind(), ErrorKind::NotConnected),
        other => panic!("Expected Transport error, got {:?}", other),
    }
    assert!(client.recv_header().is_err());
}

#[test]
fn test_connect_refused() {
    // Grab a free port, then release it so nothing listens there
    let port = {
        let scratch = TcpListener::bind("127.0.0.1:0").unwrap();
        scratch.local_addr().unwrap().port()
    };

    let result = Connection::connect(&("127.0.0.1", port));
    assert!(matches!(result, Err(RfxError::Transport { .. })));
}

#[test]
fn test_listener_bind_conflict() {
    let first = loopback_listener();
    let config = Config::builder()
        .host("127.0.0.1")
        .port(first.local_addr().port())
        .build();

    assert!(Listener::bind(&config).is_err());
}
