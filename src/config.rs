//! Configuration for SealKV
//!
//! Centralized configuration with sensible defaults.
//!
//! Nothing in here is read implicitly by the core: the binaries resolve the
//! environment once at startup and hand the resulting values down.

use std::env;
use std::fmt;
use std::time::Duration;

use crate::error::{Result, SealError};
use crate::protocol::DEFAULT_PORT;

/// Environment variable holding the 32-byte shared key
pub const KEY_ENV_VAR: &str = "SEALKV_ENCRYPTION_KEY";

/// Environment variable overriding the listen port
pub const PORT_ENV_VAR: &str = "PORT";

/// Length of an AES-256 key in bytes
pub const ENCRYPTION_KEY_SIZE: usize = 32;

// =============================================================================
// Encryption Key
// =============================================================================

/// Process-wide symmetric key, immutable once loaded
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptionKey([u8; ENCRYPTION_KEY_SIZE]);

impl EncryptionKey {
    /// Build a key from raw bytes (must be exactly 32)
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let key: [u8; ENCRYPTION_KEY_SIZE] = bytes
            .try_into()
            .map_err(|_| SealError::InvalidKeyLength(bytes.len()))?;
        Ok(Self(key))
    }

    /// Load the key from `SEALKV_ENCRYPTION_KEY`
    ///
    /// The variable's raw bytes are the key material.
    pub fn from_env() -> Result<Self> {
        let raw = env::var_os(KEY_ENV_VAR)
            .ok_or_else(|| SealError::Config(format!("{} is not set", KEY_ENV_VAR)))?;
        Self::from_bytes(raw.as_encoded_bytes())
    }

    pub fn as_bytes(&self) -> &[u8; ENCRYPTION_KEY_SIZE] {
        &self.0
    }
}

impl fmt::Debug for EncryptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EncryptionKey(<redacted>)")
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

/// Main configuration for a SealKV server
#[derive(Debug, Clone)]
pub struct Config {
    /// UDP listen address
    pub listen_addr: String,

    /// Max handlers running at once; packets past this are dropped
    pub max_in_flight: usize,

    /// Listening socket read timeout (milliseconds)
    ///
    /// Only bounds how quickly the receive loop notices shutdown.
    pub read_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: format!("0.0.0.0:{}", DEFAULT_PORT),
            max_in_flight: 1000,
            read_timeout_ms: 100,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

/// Read the `PORT` override, if set
pub fn port_from_env() -> Result<Option<u16>> {
    match env::var(PORT_ENV_VAR) {
        Ok(port) => port
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| SealError::Config(format!("invalid {}: {:?}", PORT_ENV_VAR, port))),
        Err(_) => Ok(None),
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the UDP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the admission limit
    pub fn max_in_flight(mut self, count: usize) -> Self {
        self.config.max_in_flight = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Retry and addressing settings for a client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server address (host:port)
    pub server_addr: String,

    /// Attempts per request, including the first
    pub max_attempts: u32,

    /// Delay before the second attempt; doubles afterwards
    pub base_delay: Duration,

    /// Upper bound on any single retry delay
    pub max_delay: Duration,

    /// Overall deadline used by the high-level client API
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_addr: format!("127.0.0.1:{}", DEFAULT_PORT),
            max_attempts: 10,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            request_timeout: Duration::from_secs(5),
        }
    }
}

impl ClientConfig {
    /// Create a new client config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for ClientConfig
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn server_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.server_addr = addr.into();
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.config.max_attempts = attempts;
        self
    }

    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.config.base_delay = delay;
        self
    }

    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.config.max_delay = delay;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}
