//! # SealKV
//!
//! A key-value store served over an encrypted, fixed-layout UDP protocol:
//! - Fixed 996-byte request/response frames
//! - AES-256-GCM envelopes of exactly 1024 bytes
//! - Client retries with capped exponential backoff under a global deadline
//! - Bounded-concurrency server that drops work past capacity
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Client / Transport                      │
//! │          (encode → seal → send, retry with backoff)         │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  1024-byte UDP datagram
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      UDP Server                             │
//! │        (pooled receive buffers, admission control)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │  one handler thread per packet
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Cipher    │          │  Processor  │
//!   │ (AES-GCM)   │          │ (routing)   │
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                                   ▼
//!                           ┌─────────────┐
//!                           │    Store    │
//!                           │  (RwLock)   │
//!                           └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod crypto;
pub mod store;
pub mod processor;
pub mod client;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, SealError};
pub use config::{ClientConfig, Config, EncryptionKey};
pub use client::Client;
pub use network::Server;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of SealKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
