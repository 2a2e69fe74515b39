//! Gateway listener configuration.

use serde::Deserialize;
use std::net::SocketAddr;

use super::defaults::{default_listen_address, default_max_line_length, default_outbound_queue};

/// Network listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind to (e.g., "0.0.0.0:25580").
    #[serde(default = "default_listen_address")]
    pub address: SocketAddr,
    /// Longest accepted inbound line in bytes; longer lines close the connection.
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
    /// Per-session outbound queue depth. Lines beyond it are dropped.
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: default_listen_address(),
            max_line_length: default_max_line_length(),
            outbound_queue: default_outbound_queue(),
        }
    }
}
