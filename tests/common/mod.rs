//! Integration test common infrastructure.
//!
//! Provides an in-process test server, a line-protocol test client and a
//! shared configuration with permissive defaults.

pub mod client;
pub mod server;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use server::{TestServer, test_config};
