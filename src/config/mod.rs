//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, SharedConfig)
//! - [`listen`]: Gateway listener configuration (ListenConfig)
//! - [`chat`]: Chat routing and anti-spam (ChatConfig, AntiSpamConfig)
//! - [`moderation`]: Mute behaviour and texts (ModerationConfig)
//! - [`permissions`]: Permission cache, providers and groups
//! - [`broadcast`]: Autobroadcast rotation and join/quit notices

mod broadcast;
mod chat;
mod defaults;
mod listen;
mod moderation;
mod permissions;
mod types;
mod validation;

pub use broadcast::{AutoBroadcastConfig, NotificationConfig};
pub use chat::{AntiSpamConfig, ChatConfig};
pub use listen::ListenConfig;
pub use moderation::ModerationConfig;
pub use permissions::{GroupConfig, PermissionConfig, ProvidersConfig};
pub use types::{Config, ConfigError, ServerConfig, SharedConfig};
pub use validation::{ValidationError, validate};
