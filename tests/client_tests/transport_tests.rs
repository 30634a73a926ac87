//! Tests for the client Transport
//!
//! These tests verify:
//! - Deadline requirement
//! - Frame building as seen by a server
//! - Retry on garbled or foreign replies
//! - Backoff schedule and deadline bounds
//! - Late replies never answer a later request

use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use sealkv::client::{Backoff, Transport};
use sealkv::crypto::Cipher;
use sealkv::network::DECRYPT_FAILURE_REPLY;
use sealkv::protocol::{
    decode_request, encode_response, CommandType, Flags, Request, Response, Status, ENVELOPE_SIZE,
};
use sealkv::SealError;

// =============================================================================
// Helper Functions
// =============================================================================

const TEST_KEY: &[u8; 32] = b"12345678901234567890123456789012";

fn test_cipher() -> Cipher {
    Cipher::new(TEST_KEY).unwrap()
}

/// Spawn a UDP peer that passes each datagram (and its index) to `reply`
///
/// Exits after a second without traffic. Returns its address and a counter
/// of datagrams received.
fn spawn_mock_server<F>(mut reply: F) -> (SocketAddr, Arc<AtomicUsize>)
where
    F: FnMut(usize, &[u8]) -> Option<Vec<u8>> + Send + 'static,
{
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.set_read_timeout(Some(Duration::from_secs(1))).unwrap();
    let addr = socket.local_addr().unwrap();
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);

    thread::spawn(move || {
        let mut buf = [0u8; ENVELOPE_SIZE];
        while let Ok((n, peer)) = socket.recv_from(&mut buf) {
            let index = counter.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = reply(index, &buf[..n]) {
                let _ = socket.send_to(&message, peer);
            }
        }
    });

    (addr, seen)
}

/// Answer every request with OK and the request key
fn echo_key(cipher: &Cipher, packet: &[u8]) -> Vec<u8> {
    let frame = cipher.open_frame(packet).unwrap();
    let request = decode_request(&frame).unwrap();
    cipher
        .seal_frame(&encode_response(&Response::ok(request.key)))
        .unwrap()
}

fn fast_backoff() -> Backoff {
    Backoff::new(Duration::from_millis(10), Duration::from_millis(50))
}

fn deadline_in(duration: Duration) -> Option<Instant> {
    Some(Instant::now() + duration)
}

// =============================================================================
// Backoff Tests
// =============================================================================

#[test]
fn test_backoff_schedule() {
    let backoff = Backoff::default();

    assert_eq!(backoff.delay(0), Duration::ZERO);
    assert_eq!(backoff.delay(1), Duration::from_millis(100));
    assert_eq!(backoff.delay(2), Duration::from_millis(200));
    assert_eq!(backoff.delay(3), Duration::from_millis(400));
    assert_eq!(backoff.delay(4), Duration::from_millis(800));
    assert_eq!(backoff.delay(5), Duration::from_secs(1));
    assert_eq!(backoff.delay(9), Duration::from_secs(1));
}

#[test]
fn test_backoff_large_attempt_does_not_overflow() {
    let backoff = Backoff::default();
    assert_eq!(backoff.delay(64), Duration::from_secs(1));
    assert_eq!(backoff.delay(u32::MAX), Duration::from_secs(1));
}

#[test]
fn test_backoff_total() {
    // 0 + 100 + 200 + 400 + 800 + 5 * 1000
    assert_eq!(Backoff::default().total(10), Duration::from_millis(6500));
}

// =============================================================================
// Input Validation Tests
// =============================================================================

#[test]
fn test_send_requires_deadline() {
    let (addr, seen) = spawn_mock_server(|_, _| None);
    let mut transport = Transport::connect(addr, test_cipher()).unwrap();

    let start = Instant::now();
    let result = transport.send(None, &Request::get(b"k".to_vec()));

    assert!(matches!(result, Err(SealError::NoDeadline)));
    assert!(start.elapsed() < Duration::from_millis(100));
    assert_eq!(seen.load(Ordering::SeqCst), 0);
}

#[test]
fn test_send_rejects_oversized_key_without_sending() {
    let (addr, seen) = spawn_mock_server(|_, _| None);
    let mut transport = Transport::connect(addr, test_cipher()).unwrap();

    let result = transport.send(
        deadline_in(Duration::from_secs(2)),
        &Request::get(vec![b'k'; 129]),
    );

    assert!(matches!(result, Err(SealError::KeyTooLong { .. })));
    thread::sleep(Duration::from_millis(50));
    assert_eq!(seen.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Mock Server Tests
// =============================================================================

#[test]
fn test_send_frame_reaches_server_intact() {
    let server_cipher = test_cipher();
    let (addr, _seen) = spawn_mock_server(move |_, packet| {
        assert_eq!(packet.len(), ENVELOPE_SIZE);
        let frame = server_cipher.open_frame(packet).unwrap();
        let request = decode_request(&frame).unwrap();

        assert_eq!(request.command(), Some(CommandType::Set));
        assert_eq!(request.flags, Flags::OVERWRITE | Flags::RETURN_OLD);
        assert_eq!(request.key, b"testkey");
        assert_eq!(request.value, b"testvalue");

        Some(
            server_cipher
                .seal_frame(&encode_response(&Response::ok(b"previous".to_vec())))
                .unwrap(),
        )
    });

    let mut transport = Transport::connect(addr, test_cipher()).unwrap();
    let response = transport
        .send(
            deadline_in(Duration::from_secs(2)),
            &Request::set(b"testkey".to_vec(), b"testvalue".to_vec(), true, true),
        )
        .unwrap();

    assert_eq!(response.status, Status::Ok);
    assert_eq!(response.value, b"previous");
}

#[test]
fn test_sequential_requests_on_one_socket() {
    let server_cipher = test_cipher();
    let (addr, seen) = spawn_mock_server(move |_, packet| Some(echo_key(&server_cipher, packet)));

    let mut transport = Transport::connect(addr, test_cipher()).unwrap();
    for key in ["a", "b", "c"] {
        let response = transport
            .send(deadline_in(Duration::from_secs(2)), &Request::get(key))
            .unwrap();
        assert_eq!(response.value, key.as_bytes());
    }

    assert_eq!(seen.load(Ordering::SeqCst), 3);
}

// =============================================================================
// Retry Tests
// =============================================================================

#[test]
fn test_slow_reply_within_deadline_is_accepted() {
    let server_cipher = test_cipher();
    let (addr, seen) = spawn_mock_server(move |_, packet| {
        thread::sleep(Duration::from_millis(200));
        Some(echo_key(&server_cipher, packet))
    });

    let mut transport = Transport::connect_with(addr, test_cipher(), fast_backoff(), 10).unwrap();
    let response = transport
        .send(deadline_in(Duration::from_secs(2)), &Request::get("slow"))
        .unwrap();

    // The read waits on the global deadline, not a per-attempt timeout
    assert_eq!(response.value, b"slow");
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

#[test]
fn test_retries_past_garbled_replies() {
    let server_cipher = test_cipher();
    let foreign = Cipher::new(&[9u8; 32]).unwrap();
    let (addr, seen) = spawn_mock_server(move |index, packet| match index {
        0 => Some(DECRYPT_FAILURE_REPLY.to_vec()),
        1 => Some(foreign.seal_frame(&encode_response(&Response::ok(b"spoof".to_vec()))).unwrap()),
        _ => Some(echo_key(&server_cipher, packet)),
    });

    let mut transport = Transport::connect_with(addr, test_cipher(), fast_backoff(), 10).unwrap();
    let response = transport
        .send(deadline_in(Duration::from_secs(2)), &Request::get("real"))
        .unwrap();

    assert_eq!(response.value, b"real");
    assert_eq!(seen.load(Ordering::SeqCst), 3);
}

#[test]
fn test_exhausted_attempts_wrap_last_error() {
    let (addr, seen) = spawn_mock_server(|_, _| Some(DECRYPT_FAILURE_REPLY.to_vec()));

    let mut transport = Transport::connect_with(addr, test_cipher(), fast_backoff(), 3).unwrap();
    let result = transport.send(deadline_in(Duration::from_secs(2)), &Request::get("k"));

    match result {
        Err(SealError::RetriesExhausted { attempts, source }) => {
            assert_eq!(attempts, 3);
            assert!(matches!(*source, SealError::InvalidEnvelopeSize { .. }));
        }
        other => panic!("Expected RetriesExhausted, got {:?}", other),
    }
    assert_eq!(seen.load(Ordering::SeqCst), 3);
}

#[test]
fn test_unreachable_server_waits_out_backoff() {
    // Bind and release a port so nothing is listening on it
    let addr = UdpSocket::bind("127.0.0.1:0").unwrap().local_addr().unwrap();

    let backoff = Backoff::new(Duration::from_millis(20), Duration::from_secs(1));
    let mut transport = Transport::connect_with(addr, test_cipher(), backoff, 4).unwrap();

    let start = Instant::now();
    let result = transport.send(deadline_in(Duration::from_secs(3)), &Request::get("k"));
    let elapsed = start.elapsed();

    assert!(matches!(result, Err(SealError::RetriesExhausted { attempts: 4, .. })));
    assert!(elapsed >= backoff.total(4), "gave up after {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(4), "overran deadline: {:?}", elapsed);
}

#[test]
fn test_silent_server_bounded_by_deadline() {
    let (addr, _seen) = spawn_mock_server(|_, _| None);
    let mut transport = Transport::connect(addr, test_cipher()).unwrap();

    let start = Instant::now();
    let result = transport.send(deadline_in(Duration::from_millis(300)), &Request::get("k"));
    let elapsed = start.elapsed();

    // The read timeout on the only attempt is kept as the cause
    match result {
        Err(SealError::RetriesExhausted { attempts, source }) => {
            assert_eq!(attempts, 1);
            assert!(matches!(*source, SealError::Io(_)), "source was {:?}", source);
        }
        other => panic!("Expected RetriesExhausted, got {:?}", other),
    }
    assert!(elapsed >= Duration::from_millis(250), "returned early: {:?}", elapsed);
    assert!(elapsed < Duration::from_secs(2), "overran deadline: {:?}", elapsed);
}

#[test]
fn test_deadline_during_backoff_keeps_last_error() {
    let (addr, seen) = spawn_mock_server(|_, _| Some(DECRYPT_FAILURE_REPLY.to_vec()));

    let backoff = Backoff::new(Duration::from_millis(500), Duration::from_secs(1));
    let mut transport = Transport::connect_with(addr, test_cipher(), backoff, 10).unwrap();

    let start = Instant::now();
    let result = transport.send(deadline_in(Duration::from_millis(200)), &Request::get("k"));
    let elapsed = start.elapsed();

    match result {
        Err(SealError::RetriesExhausted { attempts, source }) => {
            assert_eq!(attempts, 1);
            assert!(matches!(*source, SealError::InvalidEnvelopeSize { .. }));
        }
        other => panic!("Expected RetriesExhausted, got {:?}", other),
    }
    // Gave up at the deadline instead of sleeping the full 500ms
    assert!(elapsed < Duration::from_millis(450), "slept past deadline: {:?}", elapsed);
    assert_eq!(seen.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Stale Reply Tests
// =============================================================================

#[test]
fn test_late_reply_is_not_taken_for_next_answer() {
    let server_cipher = test_cipher();
    let (addr, seen) = spawn_mock_server(move |index, packet| {
        if index == 0 {
            thread::sleep(Duration::from_millis(300));
        }
        Some(echo_key(&server_cipher, packet))
    });

    let mut transport = Transport::connect_with(addr, test_cipher(), fast_backoff(), 10).unwrap();

    let first = transport.send(deadline_in(Duration::from_millis(100)), &Request::get("first"));
    assert!(matches!(first, Err(SealError::RetriesExhausted { attempts: 1, .. })));

    // Let the reply to "first" land in the socket
    thread::sleep(Duration::from_millis(400));

    let second = transport
        .send(deadline_in(Duration::from_secs(2)), &Request::get("second"))
        .unwrap();

    assert_eq!(second.value, b"second");
    assert_eq!(seen.load(Ordering::SeqCst), 2);
}
