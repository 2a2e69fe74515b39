//! Autobroadcast and join/quit notification configuration.

use serde::Deserialize;

use super::defaults::*;

/// Join / quit notices.
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_true")]
    pub enable_join_messages: bool,
    #[serde(default = "default_true")]
    pub enable_quit_messages: bool,
    #[serde(default = "default_join_message")]
    pub join_message: String,
    #[serde(default = "default_quit_message")]
    pub quit_message: String,
    /// Ticks a join notice waits in the delayed queue.
    #[serde(default = "default_join_delay_ticks")]
    pub join_delay_ticks: i64,
    /// Ticks a quit notice waits in the delayed queue.
    #[serde(default = "default_quit_delay_ticks")]
    pub quit_delay_ticks: i64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enable_join_messages: true,
            enable_quit_messages: true,
            join_message: default_join_message(),
            quit_message: default_quit_message(),
            join_delay_ticks: default_join_delay_ticks(),
            quit_delay_ticks: default_quit_delay_ticks(),
        }
    }
}

/// Autobroadcast rotation.
#[derive(Debug, Clone, Deserialize)]
pub struct AutoBroadcastConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Seconds between rotation messages.
    #[serde(default = "default_broadcast_interval")]
    pub interval_secs: u64,
    /// Pick a random message instead of round-robin.
    #[serde(default)]
    pub randomize: bool,
    #[serde(default)]
    pub show_prefix: bool,
    #[serde(default = "default_broadcast_prefix")]
    pub prefix: String,
    #[serde(default = "default_broadcast_messages")]
    pub messages: Vec<String>,
}

impl Default for AutoBroadcastConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_broadcast_interval(),
            randomize: false,
            show_prefix: false,
            prefix: default_broadcast_prefix(),
            messages: default_broadcast_messages(),
        }
    }
}
