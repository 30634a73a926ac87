//! Error types for SealKV
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using SealError
pub type Result<T> = std::result::Result<T, SealError>;

/// Unified error type for SealKV operations
#[derive(Debug, Error)]
pub enum SealError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Frame Errors (malformed input, never retried)
    // -------------------------------------------------------------------------
    #[error("Key too long: {len} bytes (max {max})")]
    KeyTooLong { len: usize, max: usize },

    #[error("Value too long: {len} bytes (max {max})")]
    ValueTooLong { len: usize, max: usize },

    #[error("Invalid frame size: expected {expected} bytes, got {actual}")]
    InvalidFrameSize { expected: usize, actual: usize },

    #[error("Unknown response status: 0x{0:02x}")]
    UnknownStatus(u8),

    // -------------------------------------------------------------------------
    // Cipher Errors
    // -------------------------------------------------------------------------
    #[error("Invalid key length: expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    #[error("Invalid envelope size: expected {expected} bytes, got {actual}")]
    InvalidEnvelopeSize { expected: usize, actual: usize },

    #[error("Ciphertext too short")]
    CiphertextTooShort,

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Encryption failed")]
    EncryptionFailed,

    // -------------------------------------------------------------------------
    // Client Errors
    // -------------------------------------------------------------------------
    #[error("Send requires a deadline")]
    NoDeadline,

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    #[error("Failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<SealError>,
    },

    #[error("Server error: {0}")]
    Server(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}
