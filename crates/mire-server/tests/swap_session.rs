//! End-to-end swap sessions over real TCP
//!
//! Each test boots a server task on an ephemeral port, performs the policy
//! handshake as the memory client would, and checks the placements reported
//! on the wire.

use std::net::SocketAddr;
use std::time::Duration;

use mire_protocol::{
    read_packet, write_packet, Header, Packet, ProtocolError, DENY_NO_SPACE, DENY_QUOTA_EXCEEDED,
};
use mire_server::{serve, ServerCtx};
use mire_store::SwapFile;
use tokio::net::{TcpListener, TcpStream};

const PAGE_SIZE: usize = 8;

/// Boot a server task over freshly created swap files; returns its address.
async fn start_server(file_pages: &[usize], max_frames: usize) -> SocketAddr {
    let dir = tempfile::TempDir::new().unwrap();
    let files = file_pages
        .iter()
        .enumerate()
        .map(|(i, &pages)| {
            SwapFile::create(dir.path().join(format!("swap{i}.bin")), pages, PAGE_SIZE).unwrap()
        })
        .collect();
    let mut ctx = ServerCtx {
        files,
        max_frames,
        delay: Duration::from_millis(1),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _dir = dir;
        let (mut stream, _) = listener.accept().await.unwrap();
        // Ends only on a fault; the test client decides when that happens.
        let _ = serve(&mut stream, &mut ctx).await;
    });
    addr
}

async fn handshake(addr: SocketAddr, selector: Header) -> TcpStream {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    write_packet(&mut stream, &Packet::empty(selector)).await.unwrap();
    stream
}

fn stash(pid: u32, page: u32, fill: u8) -> Packet {
    let mut payload = Vec::with_capacity(8 + PAGE_SIZE);
    payload.extend_from_slice(&pid.to_be_bytes());
    payload.extend_from_slice(&page.to_be_bytes());
    payload.extend_from_slice(&[fill; PAGE_SIZE]);
    Packet::new(Header::PageStash, payload)
}

async fn request(stream: &mut TcpStream, packet: &Packet) -> Packet {
    write_packet(stream, packet).await.unwrap();
    read_packet(stream).await.unwrap()
}

fn placement(reply: &Packet) -> (u32, u32) {
    assert_eq!(reply.header, Header::StashOk, "expected StashOk: {reply:?}");
    let p = &reply.payload;
    assert_eq!(p.len(), 8);
    (
        u32::from_be_bytes([p[0], p[1], p[2], p[3]]),
        u32::from_be_bytes([p[4], p[5], p[6], p[7]]),
    )
}

fn denial(reply: &Packet) -> u8 {
    assert_eq!(reply.header, Header::StashDenied, "expected StashDenied: {reply:?}");
    assert_eq!(reply.payload.len(), 1);
    reply.payload[0]
}

#[tokio::test]
async fn global_session_fills_the_file_then_denies() {
    let addr = start_server(&[2], 8).await;
    let mut client = handshake(addr, Header::PolicyGlobal).await;

    let first = request(&mut client, &stash(2, 0, 0x11)).await;
    assert_eq!(placement(&first), (0, 0));
    let second = request(&mut client, &stash(2, 1, 0x22)).await;
    assert_eq!(placement(&second), (0, 1));

    let third = request(&mut client, &stash(2, 2, 0x33)).await;
    assert_eq!(denial(&third), DENY_NO_SPACE);
}

#[tokio::test]
async fn restashing_a_page_returns_its_original_slot() {
    let addr = start_server(&[4], 8).await;
    let mut client = handshake(addr, Header::PolicyGlobal).await;

    let first = request(&mut client, &stash(9, 5, 0xAA)).await;
    let again = request(&mut client, &stash(9, 5, 0xBB)).await;
    assert_eq!(placement(&first), placement(&again));
}

#[tokio::test]
async fn fixed_session_enforces_the_chunk_quota() {
    let addr = start_server(&[4], 2).await;
    let mut client = handshake(addr, Header::PolicyFixed).await;

    assert_eq!(placement(&request(&mut client, &stash(1, 0, 1)).await), (0, 0));
    assert_eq!(placement(&request(&mut client, &stash(1, 1, 2)).await), (0, 1));

    // Slots 2-3 are free, but pid 1's chunk is spent.
    let denied = request(&mut client, &stash(1, 2, 3)).await;
    assert_eq!(denial(&denied), DENY_QUOTA_EXCEEDED);
}

#[tokio::test]
async fn ping_is_answered_mid_session() {
    let addr = start_server(&[2], 8).await;
    let mut client = handshake(addr, Header::PolicyGlobal).await;

    let reply = request(&mut client, &Packet::empty(Header::Ping)).await;
    assert_eq!(reply.header, Header::Ack);
    assert!(reply.payload.is_empty());
}

#[tokio::test]
async fn non_selector_handshake_kills_the_connection() {
    let addr = start_server(&[2], 8).await;
    let mut client = TcpStream::connect(addr).await.unwrap();

    write_packet(&mut client, &Packet::empty(Header::Ping)).await.unwrap();
    match read_packet(&mut client).await {
        Err(ProtocolError::PeerClosed | ProtocolError::Io(_)) => {}
        other => panic!("expected a dead connection, got {other:?}"),
    }
}

#[tokio::test]
async fn truncated_stash_payload_kills_the_connection() {
    let addr = start_server(&[2], 8).await;
    let mut client = handshake(addr, Header::PolicyGlobal).await;

    // Four bytes cannot even hold the pid, let alone the page number.
    let short = Packet::new(Header::PageStash, vec![0, 0, 0, 7]);
    write_packet(&mut client, &short).await.unwrap();
    match read_packet(&mut client).await {
        Err(ProtocolError::PeerClosed | ProtocolError::Io(_)) => {}
        other => panic!("expected a dead connection, got {other:?}"),
    }
}

#[tokio::test]
async fn policy_rebind_kills_the_connection() {
    let addr = start_server(&[2], 8).await;
    let mut client = handshake(addr, Header::PolicyGlobal).await;

    write_packet(&mut client, &Packet::empty(Header::PolicyFixed)).await.unwrap();
    match read_packet(&mut client).await {
        Err(ProtocolError::PeerClosed | ProtocolError::Io(_)) => {}
        other => panic!("expected a dead connection, got {other:?}"),
    }
}
