//! Client Transport
//!
//! One request/reply turn over a connected UDP socket, with retries.

use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::thread;
use std::time::{Duration, Instant};

use super::Backoff;
use crate::config::ClientConfig;
use crate::crypto::Cipher;
use crate::error::{Result, SealError};
use crate::protocol::{decode_response, encode_request, Request, Response, ENVELOPE_SIZE};

/// Sends requests and waits for their replies
///
/// Replies carry no request id, so a reply is matched to a request only by
/// turn order. `send` takes `&mut self`, which keeps at most one request
/// outstanding per socket, and discards any reply still queued from an
/// earlier turn before sending.
pub struct Transport {
    /// Socket connected to the server (only its datagrams are received)
    socket: UdpSocket,

    cipher: Cipher,

    backoff: Backoff,

    /// Attempts per request, including the first
    max_attempts: u32,
}

impl Transport {
    /// Connect with the default retry policy
    pub fn connect(addr: impl ToSocketAddrs, cipher: Cipher) -> Result<Self> {
        let defaults = ClientConfig::default();
        Self::connect_with(addr, cipher, Backoff::from_config(&defaults), defaults.max_attempts)
    }

    /// Connect with an explicit retry policy
    pub fn connect_with(
        addr: impl ToSocketAddrs,
        cipher: Cipher,
        backoff: Backoff,
        max_attempts: u32,
    ) -> Result<Self> {
        let server = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| SealError::Config("server address resolved to nothing".to_string()))?;

        let bind_addr: SocketAddr = if server.is_ipv4() {
            ([0, 0, 0, 0], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };

        let socket = UdpSocket::bind(bind_addr)?;
        socket.connect(server)?;

        tracing::debug!("Transport connected {} -> {}", socket.local_addr()?, server);

        Ok(Self {
            socket,
            cipher,
            backoff,
            max_attempts,
        })
    }

    /// Send a request and wait for its response
    ///
    /// The deadline is absolute and spans every attempt. It is required:
    /// without one a lost datagram would block forever.
    ///
    /// Once all attempts fail, or the deadline passes while waiting to
    /// retry, returns `RetriesExhausted` carrying the attempts made and the
    /// last attempt's error.
    pub fn send(&mut self, deadline: Option<Instant>, request: &Request) -> Result<Response> {
        let deadline = deadline.ok_or(SealError::NoDeadline)?;

        // Encode and seal once; every retry resends the same envelope
        let frame = encode_request(request)?;
        let envelope = self.cipher.seal_frame(&frame)?;

        self.discard_stale_replies()?;

        let mut last_error = None;
        for attempt in 0..self.max_attempts {
            if attempt > 0 && !wait_before_retry(deadline, self.backoff.delay(attempt)) {
                tracing::debug!(attempt, "deadline reached before retry");
                return Err(give_up(attempt, last_error));
            }

            match self.attempt(deadline, &envelope) {
                Ok(response) => return Ok(response),
                Err(e) => {
                    tracing::debug!(attempt, error = %e, "request attempt failed");
                    last_error = Some(e);
                }
            }
        }

        Err(give_up(self.max_attempts, last_error))
    }

    /// Drop replies that arrived after an earlier `send` gave up
    ///
    /// A late reply left in the socket would otherwise be read as the
    /// answer to the next request.
    fn discard_stale_replies(&self) -> Result<()> {
        self.socket.set_nonblocking(true)?;

        let mut buf = [0u8; ENVELOPE_SIZE];
        let mut discarded = 0usize;
        let drained = loop {
            match self.socket.recv(&mut buf) {
                Ok(_) => discarded += 1,
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => break Ok(()),
                // Queued ICMP errors (e.g. connection refused) carry no reply
                Err(ref e) if e.kind() == ErrorKind::ConnectionRefused => continue,
                Err(e) => break Err(e),
            }
        };

        self.socket.set_nonblocking(false)?;
        drained?;

        if discarded > 0 {
            tracing::debug!(discarded, "discarded stale replies");
        }
        Ok(())
    }

    /// Single write/read turn bounded by the global deadline
    fn attempt(&self, deadline: Instant, envelope: &[u8]) -> Result<Response> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(SealError::DeadlineExceeded);
        }

        self.socket.set_write_timeout(Some(remaining))?;
        self.socket.set_read_timeout(Some(remaining))?;

        self.socket.send(envelope)?;

        let mut buf = [0u8; ENVELOPE_SIZE];
        let n = self.socket.recv(&mut buf)?;

        let frame = self.cipher.open_frame(&buf[..n])?;
        decode_response(&frame)
    }
}

/// Sleep out a retry delay
///
/// Returns false, after sleeping only until the deadline, if the deadline
/// comes first.
fn wait_before_retry(deadline: Instant, delay: Duration) -> bool {
    let remaining = deadline.saturating_duration_since(Instant::now());
    if delay >= remaining {
        thread::sleep(remaining);
        return false;
    }
    thread::sleep(delay);
    true
}

fn give_up(attempts: u32, last_error: Option<SealError>) -> SealError {
    SealError::RetriesExhausted {
        attempts,
        source: Box::new(last_error.unwrap_or(SealError::DeadlineExceeded)),
    }
}
