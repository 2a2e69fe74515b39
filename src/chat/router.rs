//! Chat routing: gates, mode resolution, formatting and fan-out.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tracing::debug;

use super::antispam::{SpamGuard, SpamKind};
use super::format::{colorize, lookup_identity, render_chat};
use crate::config::SharedConfig;
use crate::moderation::{MuteStore, format_duration, now_millis};
use crate::permissions::{Capability, PermissionCache};
use crate::providers::IdentityProvider;
use crate::state::{Broadcaster, ChatMode, PrincipalId, Roster, RosterEntry};

/// Why a message was not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockReason {
    Muted,
    NoPermission(ChatMode),
    ModeDisabled(ChatMode),
    EmptyMessage,
    Spam(SpamKind),
}

/// Result of one routed chat event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatOutcome {
    Blocked(BlockReason),
    Delivered {
        mode: ChatMode,
        text: String,
        recipients: usize,
    },
}

/// Split `raw` into its mode and body.
///
/// A non-empty `marker` prefix selects GLOBAL and is stripped together
/// with the whitespace after it. Anything else is LOCAL and unchanged.
pub fn resolve_mode<'a>(raw: &'a str, marker: &str) -> (ChatMode, &'a str) {
    if !marker.is_empty()
        && let Some(rest) = raw.strip_prefix(marker)
    {
        return (ChatMode::Global, rest.trim_start());
    }
    (ChatMode::Local, raw)
}

/// Routes inbound chat through the mute, mode, permission and throttle
/// gates and delivers it to the right audience.
pub struct ChatRouter {
    mutes: Arc<MuteStore>,
    permissions: Arc<PermissionCache>,
    identity: Arc<dyn IdentityProvider>,
    roster: Arc<dyn Roster>,
    broadcaster: Arc<dyn Broadcaster>,
    spam: Arc<SpamGuard>,
    last_modes: DashMap<PrincipalId, ChatMode>,
    config: SharedConfig,
}

impl ChatRouter {
    pub fn new(
        config: SharedConfig,
        mutes: Arc<MuteStore>,
        permissions: Arc<PermissionCache>,
        identity: Arc<dyn IdentityProvider>,
        roster: Arc<dyn Roster>,
        broadcaster: Arc<dyn Broadcaster>,
        spam: Arc<SpamGuard>,
    ) -> Self {
        Self {
            mutes,
            permissions,
            identity,
            roster,
            broadcaster,
            spam,
            last_modes: DashMap::new(),
            config,
        }
    }

    /// Route one chat event from `sender`. Call once per logical event.
    pub async fn handle_incoming(&self, sender: &RosterEntry, raw: &str) -> ChatOutcome {
        let principal = &sender.principal;
        let perms = self.permissions.resolve(principal).await;

        if self.mutes.is_muted(&principal.id) && !perms.has(Capability::BypassMute) {
            self.notify_muted(&principal.id);
            debug!(player = %principal.name, "Chat blocked: muted");
            return ChatOutcome::Blocked(BlockReason::Muted);
        }

        let config = self.config.read().clone();
        let (mode, body) = resolve_mode(raw, &config.chat.global_chat_symbol);

        if !config.chat.mode_enabled(mode) {
            self.reply(&principal.id, &config.chat.mode_disabled_message);
            return ChatOutcome::Blocked(BlockReason::ModeDisabled(mode));
        }

        let required = match mode {
            ChatMode::Global => Capability::ChatGlobal,
            ChatMode::Local => Capability::ChatLocal,
        };
        if !perms.has(required) {
            let text = config
                .permissions
                .no_permission_message
                .replace("{permission}", required.node())
                .replace("{player}", &principal.name);
            self.reply(&principal.id, &text);
            debug!(player = %principal.name, mode = %mode, "Chat blocked: no permission");
            return ChatOutcome::Blocked(BlockReason::NoPermission(mode));
        }

        if body.trim().is_empty() {
            return ChatOutcome::Blocked(BlockReason::EmptyMessage);
        }

        if !perms.has(Capability::BypassAntiSpam)
            && let Err(kind) = self.spam.check(&principal.id, body, &config.anti_spam)
        {
            let text = match kind {
                SpamKind::Cooldown { remaining_secs } => config
                    .anti_spam
                    .cooldown_message
                    .replace("{seconds}", &remaining_secs.to_string()),
                SpamKind::Repeated => config.anti_spam.repeat_message.clone(),
                SpamKind::Flood => config.anti_spam.flood_message.clone(),
            };
            self.reply(&principal.id, &text);
            debug!(player = %principal.name, kind = ?kind, "Chat blocked: throttled");
            return ChatOutcome::Blocked(BlockReason::Spam(kind));
        }

        self.last_modes.insert(principal.id, mode);

        let identity = lookup_identity(
            self.identity.as_ref(),
            principal,
            Duration::from_millis(config.providers.identity_timeout_ms),
        )
        .await;
        let text = render_chat(config.chat.format_for(mode), principal, body, &identity);

        let recipients = match mode {
            ChatMode::Global => self.fan_out_global(sender, &text),
            ChatMode::Local => self.fan_out_local(sender, &text, config.chat.local_chat_radius),
        };

        ChatOutcome::Delivered {
            mode,
            text,
            recipients,
        }
    }

    fn fan_out_global(&self, sender: &RosterEntry, text: &str) -> usize {
        let others = self
            .roster
            .online()
            .into_iter()
            .filter(|entry| entry.principal.id != sender.principal.id)
            .filter(|entry| self.broadcaster.send_to(&entry.principal.id, text))
            .count();
        others + usize::from(self.broadcaster.send_to(&sender.principal.id, text))
    }

    fn fan_out_local(&self, sender: &RosterEntry, text: &str, radius: f64) -> usize {
        let nearby = self
            .roster
            .online()
            .into_iter()
            .filter(|entry| entry.principal.id != sender.principal.id)
            .filter(|entry| sender.within_radius(entry, radius))
            .filter(|entry| self.broadcaster.send_to(&entry.principal.id, text))
            .count();
        nearby + usize::from(self.broadcaster.send_to(&sender.principal.id, text))
    }

    /// Tell a muted sender how long is left.
    fn notify_muted(&self, id: &PrincipalId) {
        let Some(record) = self.mutes.get(id) else {
            return;
        };
        let remaining = format_duration(record.remaining_millis(now_millis()));
        let text = self
            .config
            .read()
            .moderation
            .mute_message
            .replace("{duration}", &remaining)
            .replace("{reason}", &record.reason);
        self.reply(id, &text);
    }

    fn reply(&self, id: &PrincipalId, template_text: &str) {
        self.broadcaster.send_to(id, &colorize(template_text));
    }

    /// Last mode `id` chatted in, or the configured default.
    pub fn last_mode(&self, id: &PrincipalId) -> ChatMode {
        self.last_modes
            .get(id)
            .map(|m| *m)
            .unwrap_or_else(|| self.config.read().chat.default_chat_mode)
    }

    /// Drop per-session state for `id`.
    pub fn forget(&self, id: &PrincipalId) {
        self.last_modes.remove(id);
        self.spam.forget(id);
    }
}
