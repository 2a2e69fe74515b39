//! nextgenchat - proximity and global chat routing with moderation.
//!
//! The library holds every component; `nextgenchatd` wires them together
//! around a TCP line gateway.

pub mod broadcast;
pub mod chat;
pub mod config;
pub mod error;
pub mod handlers;
pub mod hub;
pub mod moderation;
pub mod network;
pub mod permissions;
pub mod providers;
pub mod state;

pub use hub::{Hub, ReloadError};
