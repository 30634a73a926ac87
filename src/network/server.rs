//! UDP Server
//!
//! Receives datagrams and dispatches them to handler threads.

use std::io::ErrorKind;
use std::net::{SocketAddr, UdpSocket};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use super::{Admission, BufferPool, PacketHandler, ServerStats};
use crate::config::Config;
use crate::crypto::Cipher;
use crate::error::Result;
use crate::processor::Processor;
use crate::protocol::ENVELOPE_SIZE;

/// Buffers kept around for the receive loop
const POOL_CAPACITY: usize = 16;

/// Cloneable flag that stops [`Server::run`]
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Ask the server to stop; observed within one read timeout
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::Acquire)
    }
}

/// UDP server for SealKV
///
/// ## Threading
/// - One receive loop (the thread calling [`Server::run`]), which never
///   waits on a handler
/// - One short-lived thread per admitted packet, at most `max_in_flight`
///   at a time; packets past that are dropped without a reply
pub struct Server {
    socket: Arc<UdpSocket>,
    handler: Arc<PacketHandler>,
    pool: BufferPool,
    admission: Admission,
    stats: Arc<ServerStats>,
    shutdown: ShutdownHandle,
}

impl Server {
    /// Bind the listening socket
    ///
    /// Failing to bind is the only fatal error a server can hit.
    pub fn bind(config: Config, cipher: Cipher, processor: Processor) -> Result<Self> {
        let socket = UdpSocket::bind(config.listen_addr.as_str())?;
        socket.set_read_timeout(Some(config.read_timeout()))?;

        let stats = Arc::new(ServerStats::new());
        let handler = PacketHandler::new(cipher, processor, Arc::clone(&stats));

        tracing::info!("Listening on {}", socket.local_addr()?);

        Ok(Self {
            admission: Admission::new(config.max_in_flight),
            pool: BufferPool::new(POOL_CAPACITY, ENVELOPE_SIZE),
            socket: Arc::new(socket),
            handler: Arc::new(handler),
            stats,
            shutdown: ShutdownHandle::default(),
        })
    }

    /// Run the receive loop until shut down (blocking)
    pub fn run(&self) -> Result<()> {
        while !self.shutdown.is_shutdown() {
            let mut buf = self.pool.acquire();

            let (n, peer) = match self.socket.recv_from(&mut buf) {
                Ok(received) => received,
                // Read timeout: just a chance to check for shutdown
                Err(ref e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    continue;
                }
                Err(e) => {
                    tracing::error!("failed to read UDP packet: {}", e);
                    continue;
                }
            };

            // Copy out so the pooled buffer goes straight back
            let packet = buf[..n].to_vec();
            drop(buf);

            self.stats.record_received();
            self.dispatch(peer, packet);
        }

        tracing::info!(stats = ?self.stats.snapshot(), "Server stopped");
        Ok(())
    }

    /// Admit a packet into a handler thread, or drop it
    fn dispatch(&self, peer: SocketAddr, packet: Vec<u8>) {
        let Some(permit) = self.admission.try_acquire() else {
            self.stats.record_dropped();
            tracing::warn!(%peer, "request dropped - at capacity");
            return;
        };

        let handler = Arc::clone(&self.handler);
        let socket = Arc::clone(&self.socket);

        let spawned = thread::Builder::new()
            .name("sealkv-handler".to_string())
            .spawn(move || {
                let _permit = permit;
                handler.handle(&socket, peer, &packet);
            });

        // The closure (and its permit) is dropped if the spawn fails
        if let Err(e) = spawned {
            self.stats.record_dropped();
            tracing::error!(%peer, "failed to spawn handler: {}", e);
        }
    }

    /// Handle for stopping the server from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub fn stats(&self) -> Arc<ServerStats> {
        Arc::clone(&self.stats)
    }

    /// Handlers currently running
    pub fn in_flight(&self) -> usize {
        self.admission.in_flight()
    }
}
