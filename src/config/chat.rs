//! Chat routing and anti-spam configuration.

use serde::Deserialize;

use super::defaults::*;
use crate::state::ChatMode;

/// Chat routing configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Accept LOCAL messages at all.
    #[serde(default = "default_true")]
    pub enable_local_chat: bool,
    /// Accept GLOBAL messages at all.
    #[serde(default = "default_true")]
    pub enable_global_chat: bool,
    /// Radius (in world units) for LOCAL fan-out. Boundary is inclusive.
    #[serde(default = "default_local_chat_radius")]
    pub local_chat_radius: f64,
    /// Prefix that switches a message to GLOBAL. Empty disables GLOBAL detection.
    #[serde(default = "default_global_chat_symbol")]
    pub global_chat_symbol: String,
    /// Mode reported for principals that have not chatted yet.
    #[serde(default)]
    pub default_chat_mode: ChatMode,
    /// Template for GLOBAL messages (`{player}`, `{message}` plus identity placeholders).
    #[serde(default = "default_global_chat_format")]
    pub global_chat_format: String,
    /// Template for LOCAL messages.
    #[serde(default = "default_local_chat_format")]
    pub local_chat_format: String,
    /// Sent to the sender when the resolved mode is disabled.
    #[serde(default = "default_mode_disabled_message")]
    pub mode_disabled_message: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            enable_local_chat: true,
            enable_global_chat: true,
            local_chat_radius: default_local_chat_radius(),
            global_chat_symbol: default_global_chat_symbol(),
            default_chat_mode: ChatMode::default(),
            global_chat_format: default_global_chat_format(),
            local_chat_format: default_local_chat_format(),
            mode_disabled_message: default_mode_disabled_message(),
        }
    }
}

impl ChatConfig {
    /// Whether messages in `mode` are accepted.
    pub fn mode_enabled(&self, mode: ChatMode) -> bool {
        match mode {
            ChatMode::Local => self.enable_local_chat,
            ChatMode::Global => self.enable_global_chat,
        }
    }

    /// Template used to render messages in `mode`.
    pub fn format_for(&self, mode: ChatMode) -> &str {
        match mode {
            ChatMode::Local => &self.local_chat_format,
            ChatMode::Global => &self.global_chat_format,
        }
    }
}

/// Anti-spam / anti-flood throttle configuration.
///
/// Content is only ever compared for equality (repeat detection); there is
/// no classification of message text.
#[derive(Debug, Clone, Deserialize)]
pub struct AntiSpamConfig {
    /// Enable the cooldown and repeated-message checks.
    #[serde(default = "default_true")]
    pub enable_anti_spam: bool,
    /// Enable the sliding-window flood check.
    #[serde(default = "default_true")]
    pub enable_anti_flood: bool,
    /// Minimum seconds between two accepted messages (0 disables).
    #[serde(default = "default_message_cooldown")]
    pub message_cooldown_secs: u64,
    /// Identical consecutive messages allowed before blocking.
    #[serde(default = "default_max_repeated_messages")]
    pub max_repeated_messages: u32,
    /// Messages allowed inside one flood window.
    #[serde(default = "default_flood_threshold")]
    pub flood_threshold: usize,
    /// Flood window length in seconds.
    #[serde(default = "default_flood_time_window")]
    pub flood_time_window_secs: u64,
    /// Sent when the cooldown blocks a message (`{seconds}`).
    #[serde(default = "default_cooldown_message")]
    pub cooldown_message: String,
    /// Sent when a repeat is blocked.
    #[serde(default = "default_repeat_message")]
    pub repeat_message: String,
    /// Sent when the flood check blocks a message.
    #[serde(default = "default_flood_message")]
    pub flood_message: String,
}

impl Default for AntiSpamConfig {
    fn default() -> Self {
        Self {
            enable_anti_spam: true,
            enable_anti_flood: true,
            message_cooldown_secs: default_message_cooldown(),
            max_repeated_messages: default_max_repeated_messages(),
            flood_threshold: default_flood_threshold(),
            flood_time_window_secs: default_flood_time_window(),
            cooldown_message: default_cooldown_message(),
            repeat_message: default_repeat_message(),
            flood_message: default_flood_message(),
        }
    }
}

impl AntiSpamConfig {
    /// Configuration with every check switched off.
    pub fn disabled() -> Self {
        Self {
            enable_anti_spam: false,
            enable_anti_flood: false,
            ..Self::default()
        }
    }
}
