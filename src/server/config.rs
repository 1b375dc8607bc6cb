//! Server configuration.

use std::net::{SocketAddr, ToSocketAddrs};

use serde::Deserialize;

use crate::server::error::Error;

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host name or IP address to bind to.
    pub host: String,
    /// Port to bind to. `0` asks the OS for an ephemeral port.
    pub port: u16,
    /// Size of each socket read.
    pub read_buffer_size: usize,
    /// Upper bound on header block plus body, in bytes.
    pub max_request_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            read_buffer_size: 8192,
            max_request_size: 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// A default configuration bound to `host:port`.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// Load a configuration from a JSON document. Missing fields keep their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolve `host:port` to the first socket address it names.
    pub fn socket_addr(&self) -> Result<SocketAddr, Error> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| Error::InternalError(format!("{}:{} resolves to no address", self.host, self.port)))
    }
}
