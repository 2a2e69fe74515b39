//! Network module.
//!
//! Contains the Gateway (TCP listener) and the per-player Connection handler.

mod connection;
mod gateway;

pub use connection::{Connection, DEFAULT_ZONE, MAX_NAME_LEN, is_valid_name};
pub use gateway::Gateway;
