//! Core configuration types and loading.

use parking_lot::RwLock;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::broadcast::{AutoBroadcastConfig, NotificationConfig};
use super::chat::{AntiSpamConfig, ChatConfig};
use super::defaults::{default_max_players, default_server_name, default_ticks_per_second};
use super::listen::ListenConfig;
use super::moderation::ModerationConfig;
use super::permissions::{GroupConfig, PermissionConfig, ProvidersConfig};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Live configuration shared by every component.
///
/// Readers take a short read lock per operation; `/nextgenchat reload`
/// replaces the whole value under the write lock.
pub type SharedConfig = Arc<RwLock<Config>>;

/// Top-level daemon configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server identity and tick cadence.
    #[serde(default)]
    pub server: ServerConfig,
    /// Gateway listener.
    #[serde(default)]
    pub listen: ListenConfig,
    /// Chat routing (modes, radius, templates).
    #[serde(default)]
    pub chat: ChatConfig,
    /// Anti-spam / anti-flood throttle.
    #[serde(default)]
    pub anti_spam: AntiSpamConfig,
    /// Join / quit notices.
    #[serde(default)]
    pub notifications: NotificationConfig,
    /// Autobroadcast rotation.
    #[serde(default)]
    pub auto_broadcast: AutoBroadcastConfig,
    /// Mutes and moderation texts.
    #[serde(default)]
    pub moderation: ModerationConfig,
    /// Permission cache and default capability set.
    #[serde(default)]
    pub permissions: PermissionConfig,
    /// Which permission / identity provider backs the cache.
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// Group directory used by the `groups` provider.
    #[serde(default)]
    pub groups: Vec<GroupConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Wrap this configuration in a shared hot-reload handle.
    pub fn into_shared(self) -> SharedConfig {
        Arc::new(RwLock::new(self))
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server label, substituted as `{server_name}` in autobroadcasts.
    #[serde(default = "default_server_name")]
    pub name: String,
    /// Maximum concurrent players (also `{max_online}`).
    #[serde(default = "default_max_players")]
    pub max_players: usize,
    /// Scheduler ticks per second (default: 20).
    #[serde(default = "default_ticks_per_second")]
    pub ticks_per_second: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            max_players: default_max_players(),
            ticks_per_second: default_ticks_per_second(),
        }
    }
}
