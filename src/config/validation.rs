//! Configuration validation.
//!
//! Validates configuration at startup (and on reload) to catch common errors early.

use super::Config;
use crate::moderation::parse_duration;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("server.ticks_per_second must be greater than zero")]
    ZeroTickRate,
    #[error("listen.outbound_queue must be greater than zero")]
    ZeroOutboundQueue,
    #[error("chat.local_chat_radius must be a finite non-negative number, got {0}")]
    InvalidChatRadius(f64),
    #[error("chat.global_chat_symbol must not start with whitespace, got '{0}'")]
    GlobalSymbolWhitespace(String),
    #[error("anti_spam.flood_threshold and flood_time_window_secs must both be greater than zero")]
    InvalidFloodQuota,
    #[error("moderation.default_mute_duration is not a valid duration: '{0}'")]
    InvalidDefaultMuteDuration(String),
    #[error("moderation.sweep_interval_ticks must be greater than zero")]
    ZeroSweepInterval,
    #[error("providers.kind must be \"groups\" or \"none\", got '{0}'")]
    UnknownProviderKind(String),
    #[error("groups entry #{0} has an empty name")]
    EmptyGroupName(usize),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.name.is_empty() {
        errors.push(ValidationError::MissingServerName);
    }
    if config.server.ticks_per_second == 0 {
        errors.push(ValidationError::ZeroTickRate);
    }
    if config.listen.outbound_queue == 0 {
        errors.push(ValidationError::ZeroOutboundQueue);
    }

    let radius = config.chat.local_chat_radius;
    if !radius.is_finite() || radius < 0.0 {
        errors.push(ValidationError::InvalidChatRadius(radius));
    }

    // The marker is stripped before leading whitespace is trimmed, so a
    // whitespace marker would swallow ordinary local messages.
    let symbol = &config.chat.global_chat_symbol;
    if symbol.starts_with(char::is_whitespace) {
        errors.push(ValidationError::GlobalSymbolWhitespace(symbol.clone()));
    }

    let spam = &config.anti_spam;
    if spam.enable_anti_flood && (spam.flood_threshold == 0 || spam.flood_time_window_secs == 0) {
        errors.push(ValidationError::InvalidFloodQuota);
    }

    if parse_duration(&config.moderation.default_mute_duration).is_none() {
        errors.push(ValidationError::InvalidDefaultMuteDuration(
            config.moderation.default_mute_duration.clone(),
        ));
    }
    if config.moderation.sweep_interval_ticks == 0 {
        errors.push(ValidationError::ZeroSweepInterval);
    }

    if !matches!(config.providers.kind.as_str(), "groups" | "none") {
        errors.push(ValidationError::UnknownProviderKind(
            config.providers.kind.clone(),
        ));
    }
    for (idx, group) in config.groups.iter().enumerate() {
        if group.name.trim().is_empty() {
            errors.push(ValidationError::EmptyGroupName(idx));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
