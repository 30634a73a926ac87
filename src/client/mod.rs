//! Client Module
//!
//! Client-side API for talking to a SealKV server.
//!
//! ## Layers
//! - [`Transport`]: encode → seal → send → receive → open → decode, with
//!   capped exponential backoff between attempts
//! - [`Client`]: `set` / `get` / `delete` / `exists` on top of a transport,
//!   each one `Transport::send` with a deadline of `now + request_timeout`

mod backoff;
mod transport;

pub use backoff::Backoff;
pub use transport::Transport;

use std::time::{Duration, Instant};

use crate::config::{ClientConfig, EncryptionKey};
use crate::crypto::Cipher;
use crate::error::{Result, SealError};
use crate::processor::EXISTS_TRUE;
use crate::protocol::{Request, Response, Status};

/// High-level client for a SealKV server
pub struct Client {
    transport: Transport,

    /// Deadline applied to each call
    request_timeout: Duration,
}

impl Client {
    /// Connect to `config.server_addr` using `key`
    pub fn connect(config: &ClientConfig, key: &EncryptionKey) -> Result<Self> {
        let transport = Transport::connect_with(
            config.server_addr.as_str(),
            Cipher::from_key(key),
            Backoff::from_config(config),
            config.max_attempts,
        )?;

        Ok(Self {
            transport,
            request_timeout: config.request_timeout,
        })
    }

    /// Send a pre-built request and return the raw response
    pub fn execute(&mut self, request: &Request) -> Result<Response> {
        let deadline = Instant::now() + self.request_timeout;
        self.transport.send(Some(deadline), request)
    }

    /// Set a key
    ///
    /// Returns the value the server reports back (new, previous, or
    /// untouched existing value depending on the flags).
    pub fn set(&mut self, key: &[u8], value: &[u8], overwrite: bool, old: bool) -> Result<Vec<u8>> {
        let response = self.execute(&Request::set(key, value, overwrite, old))?;
        Ok(into_value(response)?.unwrap_or_default())
    }

    /// Get a value by key
    pub fn get(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let response = self.execute(&Request::get(key))?;
        into_value(response)
    }

    /// Delete a key, returning the removed value
    pub fn delete(&mut self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let response = self.execute(&Request::delete(key))?;
        into_value(response)
    }

    /// Check whether a key exists
    pub fn exists(&mut self, key: &[u8]) -> Result<bool> {
        let response = self.execute(&Request::exists(key))?;
        Ok(into_value(response)?.as_deref() == Some(EXISTS_TRUE))
    }
}

/// OK → Some(value), NOT_FOUND → None, ERROR → Err
fn into_value(response: Response) -> Result<Option<Vec<u8>>> {
    match response.status {
        Status::Ok => Ok(Some(response.value)),
        Status::NotFound => Ok(None),
        Status::Error => Err(SealError::Server(
            String::from_utf8_lossy(&response.value).into_owned(),
        )),
    }
}
