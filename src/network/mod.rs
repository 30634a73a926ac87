//! Network Module
//!
//! UDP server and packet handling.
//!
//! ## Architecture
//! - Single receive thread reading into pooled buffers
//! - Non-blocking admission gate (default 1000 slots)
//! - One handler thread per admitted packet
//! - Commands routed through the Processor

mod server;
mod handler;
mod pool;
mod admission;
mod stats;

pub use server::{Server, ShutdownHandle};
pub use handler::{PacketHandler, PacketOutcome, DECRYPT_FAILURE_REPLY};
pub use pool::{BufferPool, PooledBuffer};
pub use admission::{Admission, Permit};
pub use stats::{ServerStats, StatsSnapshot};
