//! Admission control
//!
//! A counting semaphore that never blocks: a slot is either free right now
//! or the caller is turned away.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Bounds the number of concurrently running handlers
#[derive(Debug, Clone)]
pub struct Admission {
    /// Handlers currently holding a permit
    in_flight: Arc<AtomicUsize>,

    capacity: usize,
}

impl Admission {
    pub fn new(capacity: usize) -> Self {
        Self {
            in_flight: Arc::new(AtomicUsize::new(0)),
            capacity,
        }
    }

    /// Take a slot if one is free
    ///
    /// The slot is released when the returned permit drops.
    pub fn try_acquire(&self) -> Option<Permit> {
        self.in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| {
                (n < self.capacity).then_some(n + 1)
            })
            .ok()
            .map(|_| Permit {
                in_flight: Arc::clone(&self.in_flight),
            })
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// One admitted handler's slot
#[derive(Debug)]
pub struct Permit {
    in_flight: Arc<AtomicUsize>,
}

impl Drop for Permit {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}
