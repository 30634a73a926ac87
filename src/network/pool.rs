//! Receive buffer pool
//!
//! Fixed-size buffers recycled between reads. A buffer goes back to the pool
//! when its guard drops, so the receive loop copies the datagram out and
//! releases the buffer before handing the copy to a handler.

use std::ops::{Deref, DerefMut};

use crossbeam::queue::ArrayQueue;

/// Lock-free pool of equally sized byte buffers
pub struct BufferPool {
    buffers: ArrayQueue<Vec<u8>>,
    buffer_size: usize,
}

impl BufferPool {
    /// Create a pool holding up to `capacity` buffers of `buffer_size` bytes
    pub fn new(capacity: usize, buffer_size: usize) -> Self {
        let buffers = ArrayQueue::new(capacity.max(1));
        for _ in 0..buffers.capacity() {
            let _ = buffers.push(vec![0u8; buffer_size]);
        }

        Self {
            buffers,
            buffer_size,
        }
    }

    /// Take a buffer, allocating a fresh one if the pool is empty
    pub fn acquire(&self) -> PooledBuffer<'_> {
        let buffer = self
            .buffers
            .pop()
            .unwrap_or_else(|| vec![0u8; self.buffer_size]);

        PooledBuffer { buffer, pool: self }
    }

    /// Number of buffers currently sitting in the pool
    pub fn available(&self) -> usize {
        self.buffers.len()
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }
}

/// A buffer on loan from a [`BufferPool`]
pub struct PooledBuffer<'a> {
    buffer: Vec<u8>,
    pool: &'a BufferPool,
}

impl Drop for PooledBuffer<'_> {
    fn drop(&mut self) {
        // A full pool just lets the extra buffer go
        let _ = self.pool.buffers.push(std::mem::take(&mut self.buffer));
    }
}

impl Deref for PooledBuffer<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.buffer
    }
}

impl DerefMut for PooledBuffer<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }
}
