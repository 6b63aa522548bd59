//! Client configuration
//!
//! Settings come from a TOML document or from environment variables:
//! - `REDIS_MODULES_ADDR`: server address (default: 127.0.0.1:6379)
//! - `REDIS_MODULES_READ_BUFFER`: initial reply buffer capacity in bytes (default: 8192)
//! - `REDIS_MODULES_RESPONSE_TIMEOUT_MS`: per-reply timeout in milliseconds (default: none)

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Connection-level settings consumed by [`RespConnection`](crate::transport::RespConnection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// `host:port` of the server
    pub addr: String,
    /// Initial capacity of the reply read buffer
    pub read_buffer_capacity: usize,
    /// Upper bound on waiting for one reply, in milliseconds
    pub response_timeout_ms: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            addr: "127.0.0.1:6379".to_string(),
            read_buffer_capacity: 8192,
            response_timeout_ms: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables. Unparseable or zero
    /// values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = ClientConfig::default();
        ClientConfig {
            addr: std::env::var("REDIS_MODULES_ADDR").unwrap_or(defaults.addr),
            read_buffer_capacity: std::env::var("REDIS_MODULES_READ_BUFFER")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.read_buffer_capacity),
            response_timeout_ms: std::env::var("REDIS_MODULES_RESPONSE_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&ms| ms > 0)
                .or(defaults.response_timeout_ms),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(s).map_err(|e| Error::Config(e.to_string()))?;
        if config.response_timeout_ms == Some(0) {
            return Err(Error::Config(
                "response_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if config.read_buffer_capacity == 0 {
            return Err(Error::Config(
                "read_buffer_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }
}
