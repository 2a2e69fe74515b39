//! Permission cache, provider selection and group directory configuration.

use serde::Deserialize;

use super::defaults::*;
use crate::permissions::PermissionSet;

/// Permission cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct PermissionConfig {
    /// Cache resolved sets; when off, every check asks the provider.
    #[serde(default = "default_true")]
    pub enable_cache: bool,
    /// Seconds a cached set stays fresh.
    #[serde(default = "default_cache_timeout")]
    pub cache_timeout_secs: u64,
    /// Log every resolved set at debug level.
    #[serde(default)]
    pub debug_logging: bool,
    /// Capabilities granted when the provider is unavailable or fails.
    #[serde(default)]
    pub defaults: PermissionSet,
    /// Sent when a chat mode is refused (`{permission}`, `{player}`).
    #[serde(default = "default_no_permission_message")]
    pub no_permission_message: String,
    /// Sent when a command is refused.
    #[serde(default = "default_command_no_permission_message")]
    pub command_no_permission_message: String,
}

impl Default for PermissionConfig {
    fn default() -> Self {
        Self {
            enable_cache: true,
            cache_timeout_secs: default_cache_timeout(),
            debug_logging: false,
            defaults: PermissionSet::default(),
            no_permission_message: default_no_permission_message(),
            command_no_permission_message: default_command_no_permission_message(),
        }
    }
}

/// External provider selection.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    /// `"groups"` for the built-in group directory, `"none"` for defaults only.
    #[serde(default = "default_provider_kind")]
    pub kind: String,
    /// Budget for one identity lookup before placeholders fall back to empty.
    #[serde(default = "default_identity_timeout_ms")]
    pub identity_timeout_ms: u64,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            kind: default_provider_kind(),
            identity_timeout_ms: default_identity_timeout_ms(),
        }
    }
}

/// One `[[groups]]` entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GroupConfig {
    pub name: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    /// Highest weight wins when a principal belongs to several groups.
    #[serde(default)]
    pub weight: i32,
    /// Applies to every principal.
    #[serde(default)]
    pub default: bool,
    /// Display names (case-insensitive).
    #[serde(default)]
    pub members: Vec<String>,
    /// Permission nodes; `prefix.*` grants every node under `prefix.`.
    #[serde(default)]
    pub permissions: Vec<String>,
}
