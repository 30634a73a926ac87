//! Server counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Packet counters updated by the receive loop and the handlers
#[derive(Debug, Default)]
pub struct ServerStats {
    received: AtomicU64,
    dropped: AtomicU64,
    handled: AtomicU64,
    decrypt_failures: AtomicU64,
    invalid_frames: AtomicU64,
    send_failures: AtomicU64,
}

/// Point-in-time copy of [`ServerStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Datagrams read off the socket
    pub received: u64,

    /// Datagrams dropped because every handler slot was taken
    pub dropped: u64,

    /// Requests answered with a sealed response
    pub handled: u64,

    pub decrypt_failures: u64,

    /// Decrypted frames that failed to decode
    pub invalid_frames: u64,

    /// Replies that could not be sealed or written
    pub send_failures: u64,
}

impl ServerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_handled(&self) {
        self.handled.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_decrypt_failure(&self) {
        self.decrypt_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_invalid_frame(&self) {
        self.invalid_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_send_failure(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            handled: self.handled.load(Ordering::Relaxed),
            decrypt_failures: self.decrypt_failures.load(Ordering::Relaxed),
            invalid_frames: self.invalid_frames.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
        }
    }
}
