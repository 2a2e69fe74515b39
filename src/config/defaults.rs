//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse. Text defaults keep
//! the `&` color-escape notation; the formatter turns it into `§` codes.

use std::net::SocketAddr;

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// Server Defaults
// =============================================================================

pub fn default_server_name() -> String {
    "NextgenChat".to_string()
}

pub fn default_max_players() -> usize {
    100
}

pub fn default_ticks_per_second() -> u32 {
    20
}

pub fn default_listen_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 25580))
}

pub fn default_max_line_length() -> usize {
    512
}

pub fn default_outbound_queue() -> usize {
    256
}

// =============================================================================
// Chat Defaults
// =============================================================================

pub fn default_local_chat_radius() -> f64 {
    100.0
}

pub fn default_global_chat_symbol() -> String {
    "!".to_string()
}

pub fn default_global_chat_format() -> String {
    "&6[G] &f%prefix%{player}%suffix%: &7{message}".to_string()
}

pub fn default_local_chat_format() -> String {
    "&7[Локальный] &f%prefix%{player}%suffix%: &7{message}".to_string()
}

pub fn default_mode_disabled_message() -> String {
    "&cЭтот режим чата отключён".to_string()
}

// =============================================================================
// Anti-Spam Defaults
// =============================================================================

pub fn default_message_cooldown() -> u64 {
    3
}

pub fn default_max_repeated_messages() -> u32 {
    3
}

pub fn default_flood_threshold() -> usize {
    5
}

pub fn default_flood_time_window() -> u64 {
    10
}

pub fn default_cooldown_message() -> String {
    "&cПодождите {seconds}с перед следующим сообщением".to_string()
}

pub fn default_repeat_message() -> String {
    "&cНе повторяйте одно и то же сообщение".to_string()
}

pub fn default_flood_message() -> String {
    "&cСлишком много сообщений, не флудите".to_string()
}

// =============================================================================
// Notification Defaults
// =============================================================================

pub fn default_join_message() -> String {
    "&a+ %prefix%{player} присоединился к серверу".to_string()
}

pub fn default_quit_message() -> String {
    "&c- %prefix%{player} покинул сервер".to_string()
}

pub fn default_join_delay_ticks() -> i64 {
    5
}

pub fn default_quit_delay_ticks() -> i64 {
    3
}

// =============================================================================
// Autobroadcast Defaults
// =============================================================================

pub fn default_broadcast_interval() -> u64 {
    300
}

pub fn default_broadcast_prefix() -> String {
    "&d[Автобродкаст] &r".to_string()
}

pub fn default_broadcast_messages() -> Vec<String> {
    [
        "&6&lДобро пожаловать на сервер!",
        "&eНе забудьте прочитать правила!",
        "&aПриятной игры!",
        "&bОнлайн: &f{online}&b/&f{max_online}",
        "&7Использование памяти: &f{memory_used}MB&7/&f{memory_max}MB",
        "&3Время: &f{uptime_hours}&3ч &f{uptime_minutes}&3м",
        "&5Сервер: &f{server_name}",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

// =============================================================================
// Moderation Defaults
// =============================================================================

pub fn default_mute_duration() -> String {
    "1h".to_string()
}

pub fn default_mute_reason() -> String {
    "Нарушение правил".to_string()
}

pub fn default_mute_data_path() -> String {
    "nextgenchat_mutes.json".to_string()
}

pub fn default_sweep_interval_ticks() -> u64 {
    100
}

pub fn default_mute_message() -> String {
    "&cВы заблокированы в чате на {duration}. Причина: {reason}".to_string()
}

pub fn default_unmute_message() -> String {
    "&aВы разблокированы в чате".to_string()
}

pub fn default_mute_notification() -> String {
    "&c{player} заблокирован в чате на {duration}".to_string()
}

pub fn default_unmute_notification() -> String {
    "&a{player} разблокирован в чате".to_string()
}

pub fn default_already_muted_message() -> String {
    "&c{player} уже заблокирован в чате".to_string()
}

pub fn default_not_muted_message() -> String {
    "&c{player} не заблокирован в чате".to_string()
}

pub fn default_player_not_found_message() -> String {
    "&cИгрок {player} не найден".to_string()
}

pub fn default_invalid_duration_message() -> String {
    "&cНеверный формат времени. Используйте: 1h, 30m, 1d".to_string()
}

pub fn default_moderation_disabled_message() -> String {
    "&cМодерация отключена".to_string()
}

pub fn default_staff_prefix() -> String {
    "&e[Модерация] ".to_string()
}

// =============================================================================
// Permission Defaults
// =============================================================================

pub fn default_cache_timeout() -> u64 {
    300
}

pub fn default_no_permission_message() -> String {
    "&cУ вас нет права {permission} для выполнения этого действия".to_string()
}

pub fn default_command_no_permission_message() -> String {
    "&cУ вас нет прав для использования этой команды".to_string()
}

pub fn default_provider_kind() -> String {
    "none".to_string()
}

pub fn default_identity_timeout_ms() -> u64 {
    250
}
