//! Moderation (mute) configuration.

use serde::Deserialize;

use super::defaults::*;

/// Mute behaviour and user-facing moderation texts.
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationConfig {
    /// Master switch. When off, nobody is muted and mute/unmute are refused.
    #[serde(default = "default_true")]
    pub enable_moderation: bool,
    /// Persist mute records to `mute_data_path`.
    #[serde(default = "default_true")]
    pub save_mute_data: bool,
    /// JSON file holding the mute records.
    #[serde(default = "default_mute_data_path")]
    pub mute_data_path: String,
    /// Duration used when `/mute` omits one (`<n><m|h|d|w>`).
    #[serde(default = "default_mute_duration")]
    pub default_mute_duration: String,
    /// Reason used when `/mute` omits one.
    #[serde(default = "default_mute_reason")]
    pub default_reason: String,
    /// Ticks between expired-mute sweeps.
    #[serde(default = "default_sweep_interval_ticks")]
    pub sweep_interval_ticks: u64,
    /// Notify principals holding the moderation-notification capability.
    #[serde(default = "default_true")]
    pub notify_staff_on_mute: bool,
    /// Log mute, unmute and expiry actions at info level.
    #[serde(default = "default_true")]
    pub log_mute_actions: bool,

    #[serde(default = "default_mute_message")]
    pub mute_message: String,
    #[serde(default = "default_unmute_message")]
    pub unmute_message: String,
    #[serde(default = "default_mute_notification")]
    pub mute_notification: String,
    #[serde(default = "default_unmute_notification")]
    pub unmute_notification: String,
    #[serde(default = "default_already_muted_message")]
    pub already_muted_message: String,
    #[serde(default = "default_not_muted_message")]
    pub not_muted_message: String,
    #[serde(default = "default_player_not_found_message")]
    pub player_not_found_message: String,
    #[serde(default = "default_invalid_duration_message")]
    pub invalid_duration_message: String,
    #[serde(default = "default_moderation_disabled_message")]
    pub moderation_disabled_message: String,
    /// Prepended to staff copies of mute notifications.
    #[serde(default = "default_staff_prefix")]
    pub staff_prefix: String,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            enable_moderation: true,
            save_mute_data: true,
            mute_data_path: default_mute_data_path(),
            default_mute_duration: default_mute_duration(),
            default_reason: default_mute_reason(),
            sweep_interval_ticks: default_sweep_interval_ticks(),
            notify_staff_on_mute: true,
            log_mute_actions: true,
            mute_message: default_mute_message(),
            unmute_message: default_unmute_message(),
            mute_notification: default_mute_notification(),
            unmute_notification: default_unmute_notification(),
            already_muted_message: default_already_muted_message(),
            not_muted_message: default_not_muted_message(),
            player_not_found_message: default_player_not_found_message(),
            invalid_duration_message: default_invalid_duration_message(),
            moderation_disabled_message: default_moderation_disabled_message(),
            staff_prefix: default_staff_prefix(),
        }
    }
}
