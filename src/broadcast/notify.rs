//! Moderation notices and delayed join/quit messages.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::DelayedBroadcastQueue;
use crate::chat::format::{colorize, lookup_identity, render_notice};
use crate::config::SharedConfig;
use crate::moderation::{MuteRecord, format_duration};
use crate::permissions::PermissionCache;
use crate::providers::IdentityProvider;
use crate::state::{Broadcaster, Principal, Roster};

pub struct Notifier {
    queue: Arc<DelayedBroadcastQueue>,
    permissions: Arc<PermissionCache>,
    identity: Arc<dyn IdentityProvider>,
    roster: Arc<dyn Roster>,
    broadcaster: Arc<dyn Broadcaster>,
    config: SharedConfig,
}

impl Notifier {
    pub fn new(
        config: SharedConfig,
        queue: Arc<DelayedBroadcastQueue>,
        permissions: Arc<PermissionCache>,
        identity: Arc<dyn IdentityProvider>,
        roster: Arc<dyn Roster>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        Self {
            queue,
            permissions,
            identity,
            roster,
            broadcaster,
            config,
        }
    }

    /// Announce a new mute to the target, the moderator and staff.
    pub async fn muted(&self, record: &MuteRecord) {
        let duration = format_duration(record.duration_millis);
        let (target_text, notification, staff_prefix, notify_staff, log) = {
            let config = self.config.read();
            let moderation = &config.moderation;
            (
                moderation
                    .mute_message
                    .replace("{duration}", &duration)
                    .replace("{reason}", &record.reason),
                moderation
                    .mute_notification
                    .replace("{player}", &record.principal_name)
                    .replace("{duration}", &duration)
                    .replace("{reason}", &record.reason)
                    .replace("{moderator}", &record.moderator_name),
                moderation.staff_prefix.clone(),
                moderation.notify_staff_on_mute,
                moderation.log_mute_actions,
            )
        };

        self.broadcaster.send_to(&record.principal, &colorize(&target_text));
        self.broadcaster.send_to(&record.moderator, &colorize(&notification));
        if notify_staff {
            self.notify_staff(&format!("{staff_prefix}{notification}")).await;
        }
        if log {
            info!(
                player = %record.principal_name,
                moderator = %record.moderator_name,
                duration = %duration,
                reason = %record.reason,
                "Player muted"
            );
        }
    }

    /// Announce a lifted mute to the target, the moderator and staff.
    pub async fn unmuted(&self, record: &MuteRecord, moderator: &Principal) {
        let (target_text, notification, staff_prefix, notify_staff, log) = {
            let config = self.config.read();
            let moderation = &config.moderation;
            (
                moderation.unmute_message.clone(),
                moderation
                    .unmute_notification
                    .replace("{player}", &record.principal_name)
                    .replace("{moderator}", &moderator.name),
                moderation.staff_prefix.clone(),
                moderation.notify_staff_on_mute,
                moderation.log_mute_actions,
            )
        };

        self.broadcaster.send_to(&record.principal, &colorize(&target_text));
        self.broadcaster.send_to(&moderator.id, &colorize(&notification));
        if notify_staff {
            self.notify_staff(&format!("{staff_prefix}{notification}")).await;
        }
        if log {
            info!(
                player = %record.principal_name,
                moderator = %moderator.name,
                "Player unmuted"
            );
        }
    }

    async fn notify_staff(&self, text: &str) {
        let text = colorize(text);
        for entry in self.roster.online() {
            if self
                .permissions
                .can_receive_mod_notifications(&entry.principal)
                .await
            {
                self.broadcaster.send_to(&entry.principal.id, &text);
            }
        }
    }

    /// Queue the join notice for `principal`.
    pub async fn player_joined(&self, principal: &Principal) {
        let (enabled, template, delay, timeout) = {
            let config = self.config.read();
            let n = &config.notifications;
            (
                n.enable_join_messages,
                n.join_message.clone(),
                n.join_delay_ticks,
                config.providers.identity_timeout_ms,
            )
        };
        if enabled {
            self.enqueue_notice(principal, &template, delay, timeout).await;
        }
    }

    /// Queue the quit notice for `principal`.
    pub async fn player_left(&self, principal: &Principal) {
        let (enabled, template, delay, timeout) = {
            let config = self.config.read();
            let n = &config.notifications;
            (
                n.enable_quit_messages,
                n.quit_message.clone(),
                n.quit_delay_ticks,
                config.providers.identity_timeout_ms,
            )
        };
        if enabled {
            self.enqueue_notice(principal, &template, delay, timeout).await;
        }
    }

    async fn enqueue_notice(&self, principal: &Principal, template: &str, delay: i64, timeout_ms: u64) {
        let identity = lookup_identity(
            self.identity.as_ref(),
            principal,
            Duration::from_millis(timeout_ms),
        )
        .await;
        self.queue
            .enqueue(render_notice(template, principal, &identity), delay);
    }
}
