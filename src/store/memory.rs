//! In-memory store
//!
//! HashMap behind a single RwLock.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::Store;

/// Volatile map store
///
/// ## Concurrency:
/// - `get` / `exists` take the shared (read) lock
/// - `set` / `delete` take the exclusive (write) lock
/// - No per-key locking, so writes are serialized store-wide
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl Store for MemoryStore {
    fn set(&self, key: &[u8], value: &[u8], overwrite: bool, old: bool) -> (Vec<u8>, bool) {
        let mut data = self.data.write();

        match data.get_mut(key) {
            Some(existing) if !overwrite => (existing.clone(), true),
            Some(existing) => {
                let previous = std::mem::replace(existing, value.to_vec());
                if old {
                    (previous, true)
                } else {
                    (value.to_vec(), true)
                }
            }
            None => {
                data.insert(key.to_vec(), value.to_vec());
                if old {
                    (Vec::new(), false)
                } else {
                    (value.to_vec(), false)
                }
            }
        }
    }

    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.data.read().get(key).cloned()
    }

    fn delete(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.data.write().remove(key)
    }

    fn exists(&self, key: &[u8]) -> bool {
        self.data.read().contains_key(key)
    }
}
