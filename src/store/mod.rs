//! Store Module
//!
//! The key-value capability the command processor drives.
//!
//! ## Responsibilities
//! - Exactly four operations: set / get / delete / exists
//! - All locking lives behind the trait; callers never coordinate
//!
//! The processor holds the store it was constructed with, so any number of
//! independent stores can coexist in one process (one per test, say).

mod memory;

pub use memory::MemoryStore;

/// Key-value capability consumed by [`crate::processor::Processor`]
pub trait Store: Send + Sync {
    /// Store `value` under `key` unless the key exists and `overwrite` is off
    ///
    /// Returns `(value, found)` where `found` says whether the key existed
    /// beforehand and `value` is:
    /// - the existing value, when the key exists and `overwrite` is off
    /// - the previous value (empty if absent), when stored with `old` set
    /// - the new value otherwise
    fn set(&self, key: &[u8], value: &[u8], overwrite: bool, old: bool) -> (Vec<u8>, bool);

    /// Look up a key
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Remove a key, returning what it held
    fn delete(&self, key: &[u8]) -> Option<Vec<u8>>;

    fn exists(&self, key: &[u8]) -> bool;
}
