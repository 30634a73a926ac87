//! Crypto Module
//!
//! Authenticated encryption for everything placed on the wire.
//!
//! ## Envelope Format
//! ```text
//! ┌───────────┬──────────────────────────────┬───────────┐
//! │ Nonce(12) │   Ciphertext (996, frame)    │  Tag (16) │
//! └───────────┴──────────────────────────────┴───────────┘
//! ```
//!
//! The key is process-wide and loaded once; see
//! [`crate::config::EncryptionKey`].

mod cipher;

pub use cipher::Cipher;
