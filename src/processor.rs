//! Processor Module
//!
//! Decodes request frames, drives the store, and builds status-coded
//! responses.
//!
//! ## Status mapping
//! - SET:    always OK (value per [`Store::set`])
//! - GET:    OK with value, NOT_FOUND if absent
//! - DELETE: OK with removed value, NOT_FOUND if absent
//! - EXISTS: OK with `"1"` or `"0"`
//! - unknown opcode: ERROR with a description

use std::sync::Arc;

use crate::error::Result;
use crate::protocol::{decode_request, CommandType, Request, Response};
use crate::store::Store;

/// Value returned by EXISTS for a present key
pub const EXISTS_TRUE: &[u8] = b"1";

/// Value returned by EXISTS for an absent key
pub const EXISTS_FALSE: &[u8] = b"0";

/// Routes requests to a store
///
/// Makes no retry or locking decisions of its own.
#[derive(Clone)]
pub struct Processor {
    store: Arc<dyn Store>,
}

impl Processor {
    /// Create a processor owning a handle to `store`
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Decode a plaintext frame and route it
    ///
    /// Fails only when the frame itself is malformed.
    pub fn process_frame(&self, frame: &[u8]) -> Result<Response> {
        let request = decode_request(frame)?;
        Ok(self.route(&request))
    }

    /// Execute a request and return a response
    pub fn route(&self, request: &Request) -> Response {
        let Some(command) = request.command() else {
            return Response::error(&format!("unknown command: {}", request.opcode));
        };

        tracing::trace!(%command, key_len = request.key.len(), "routing request");

        match command {
            CommandType::Set => {
                let (value, _) = self.store.set(
                    &request.key,
                    &request.value,
                    request.overwrite(),
                    request.return_old(),
                );
                Response::ok(value)
            }
            CommandType::Get => match self.store.get(&request.key) {
                Some(value) => Response::ok(value),
                None => Response::not_found(),
            },
            CommandType::Delete => match self.store.delete(&request.key) {
                Some(value) => Response::ok(value),
                None => Response::not_found(),
            },
            CommandType::Exists => {
                if self.store.exists(&request.key) {
                    Response::ok(EXISTS_TRUE)
                } else {
                    Response::ok(EXISTS_FALSE)
                }
            }
        }
    }

    /// Get the underlying store
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }
}
