//! Packet Handler
//!
//! Handles one admitted datagram from start to finish.
//!
//! ```text
//! Received ─▶ Decrypted ─┬─▶ CommandExecuted ─┐
//!     │                  └─▶ FrameInvalid ────┼─▶ ResponseSent
//!     └─▶ DecryptFailed ──────────────────────┘
//! ```

use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;

use super::ServerStats;
use crate::crypto::Cipher;
use crate::processor::Processor;
use crate::protocol::{encode_response, Response};

/// Plaintext reply to a packet that could not be decrypted
///
/// The sender may not hold the key, so nothing structured is sent back.
pub const DECRYPT_FAILURE_REPLY: &[u8] = b"ERROR: failed to process message";

/// How a packet was dealt with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketOutcome {
    /// Decoded and executed; sealed response written
    CommandExecuted,

    /// Decrypted but not a valid frame; sealed ERROR response written
    FrameInvalid,

    /// Failed authentication; plaintext error tag written
    DecryptFailed,

    /// Reply could not be sealed or written
    Unanswered,
}

/// Shared, stateless per-packet logic
pub struct PacketHandler {
    cipher: Cipher,
    processor: Processor,
    stats: Arc<ServerStats>,
}

impl PacketHandler {
    pub fn new(cipher: Cipher, processor: Processor, stats: Arc<ServerStats>) -> Self {
        Self {
            cipher,
            processor,
            stats,
        }
    }

    /// Process `packet` from `peer` and write the reply on `socket`
    pub fn handle(&self, socket: &UdpSocket, peer: SocketAddr, packet: &[u8]) -> PacketOutcome {
        let frame = match self.cipher.open_frame(packet) {
            Ok(frame) => frame,
            Err(e) => {
                self.stats.record_decrypt_failure();
                tracing::warn!(%peer, error = %e, "Decrypt failed");
                if self.send(socket, peer, DECRYPT_FAILURE_REPLY) {
                    return PacketOutcome::DecryptFailed;
                }
                return PacketOutcome::Unanswered;
            }
        };

        let (response, outcome) = match self.processor.process_frame(&frame) {
            Ok(response) => (response, PacketOutcome::CommandExecuted),
            Err(e) => {
                self.stats.record_invalid_frame();
                tracing::warn!(%peer, error = %e, "Invalid frame");
                (Response::error(&e.to_string()), PacketOutcome::FrameInvalid)
            }
        };

        let envelope = match self.cipher.seal_frame(&encode_response(&response)) {
            Ok(envelope) => envelope,
            Err(e) => {
                // Left unanswered; the client retries
                self.stats.record_send_failure();
                tracing::error!(%peer, error = %e, "Encryption failed");
                return PacketOutcome::Unanswered;
            }
        };

        if !self.send(socket, peer, &envelope) {
            return PacketOutcome::Unanswered;
        }

        self.stats.record_handled();
        tracing::debug!(%peer, status = ?response.status, "Response sent");
        outcome
    }

    fn send(&self, socket: &UdpSocket, peer: SocketAddr, message: &[u8]) -> bool {
        match socket.send_to(message, peer) {
            Ok(_) => true,
            Err(e) => {
                self.stats.record_send_failure();
                tracing::error!(%peer, error = %e, "failed to write response");
                false
            }
        }
    }
}
