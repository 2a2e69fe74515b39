//! Unified error handling for nextgenchat.
//!
//! Domain outcomes (mute failures, provider failures) are plain values that
//! callers render into user-facing text. Infrastructure failures are logged
//! where they happen and absorbed.

use crate::config::Config;
use thiserror::Error;

// ============================================================================
// Handler Errors (command processing)
// ============================================================================

/// Errors that can occur during command handling.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("usage: {0}")]
    NeedMoreParams(&'static str),

    #[error("access denied")]
    AccessDenied,

    #[error("player not found: {0}")]
    PlayerNotFound(String),

    #[error("invalid duration")]
    InvalidDuration,

    #[error("{0} is already muted")]
    AlreadyMuted(String),

    #[error("{0} is not muted")]
    NotMuted(String),

    #[error("moderation is disabled")]
    ModerationDisabled,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("reload failed: {0}")]
    Reload(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NeedMoreParams(_) => "need_more_params",
            Self::AccessDenied => "access_denied",
            Self::PlayerNotFound(_) => "player_not_found",
            Self::InvalidDuration => "invalid_duration",
            Self::AlreadyMuted(_) => "already_muted",
            Self::NotMuted(_) => "not_muted",
            Self::ModerationDisabled => "moderation_disabled",
            Self::UnknownCommand(_) => "unknown_command",
            Self::Reload(_) => "reload_failed",
            Self::Internal(_) => "internal_error",
        }
    }

    /// Render the reply sent back to the issuing player.
    ///
    /// Returns `None` for errors that don't warrant a player-visible reply.
    /// The text still carries `&` color escapes.
    pub fn to_user_reply(&self, config: &Config) -> Option<String> {
        let moderation = &config.moderation;
        let reply = match self {
            Self::NeedMoreParams(usage) => format!("&cИспользование: {usage}"),
            Self::AccessDenied => config.permissions.command_no_permission_message.clone(),
            Self::PlayerNotFound(name) => moderation.player_not_found_message.replace("{player}", name),
            Self::InvalidDuration => moderation.invalid_duration_message.clone(),
            Self::AlreadyMuted(name) => moderation.already_muted_message.replace("{player}", name),
            Self::NotMuted(name) => moderation.not_muted_message.replace("{player}", name),
            Self::ModerationDisabled => moderation.moderation_disabled_message.clone(),
            Self::UnknownCommand(cmd) => format!("&cНеизвестная команда: /{cmd}"),
            Self::Reload(reason) => format!("&cОшибка перезагрузки конфигурации: {reason}"),

            Self::Internal(_) => return None,
        };
        Some(reply)
    }
}

/// Result type for command handlers.
pub type HandlerResult = Result<(), HandlerError>;

// ============================================================================
// Mute Errors (moderation store)
// ============================================================================

/// Outcome of a refused mute or unmute.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MuteError {
    #[error("target already has an active mute")]
    AlreadyMuted,

    #[error("target has no active mute")]
    NotMuted,

    #[error("duration must be <number><m|h|d|w> and greater than zero")]
    InvalidDuration,

    #[error("moderation is disabled")]
    ModerationDisabled,
}

impl MuteError {
    /// Convert into a command error naming the target.
    pub fn for_target(self, name: &str) -> HandlerError {
        match self {
            Self::AlreadyMuted => HandlerError::AlreadyMuted(name.to_string()),
            Self::NotMuted => HandlerError::NotMuted(name.to_string()),
            Self::InvalidDuration => HandlerError::InvalidDuration,
            Self::ModerationDisabled => HandlerError::ModerationDisabled,
        }
    }
}

// ============================================================================
// Persistence Errors (mute records on disk)
// ============================================================================

/// Failure while loading or saving mute records.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("mute data io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("mute data serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// ============================================================================
// Provider Errors (permission / identity lookups)
// ============================================================================

/// Failure of an external permission or identity lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("provider unavailable")]
    Unavailable,

    #[error("provider timed out")]
    Timeout,

    #[error("principal unknown to provider")]
    UnknownPrincipal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_error_codes() {
        assert_eq!(HandlerError::NeedMoreParams("/mute <player>").error_code(), "need_more_params");
        assert_eq!(HandlerError::AccessDenied.error_code(), "access_denied");
        assert_eq!(HandlerError::Internal("test".into()).error_code(), "internal_error");
    }

    #[test]
    fn test_handler_error_to_user_reply() {
        let config = Config::default();
        let reply = HandlerError::PlayerNotFound("Steve".into()).to_user_reply(&config);
        assert_eq!(reply.as_deref(), Some("&cИгрок Steve не найден"));

        let reply = HandlerError::AccessDenied.to_user_reply(&config);
        assert_eq!(reply, Some(config.permissions.command_no_permission_message.clone()));

        // Internal errors don't generate replies
        assert!(HandlerError::Internal("oops".into()).to_user_reply(&config).is_none());
    }

    #[test]
    fn test_mute_error_names_target() {
        let err = MuteError::AlreadyMuted.for_target("Alex");
        assert!(matches!(err, HandlerError::AlreadyMuted(ref n) if n == "Alex"));
        let err = MuteError::InvalidDuration.for_target("Alex");
        assert!(matches!(err, HandlerError::InvalidDuration));
    }
}
