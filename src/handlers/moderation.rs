//! Moderation commands: /mute, /unmute, /mutelist.

use async_trait::async_trait;

use super::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};
use crate::moderation::{format_duration, now_millis};
use crate::permissions::Capability;
use crate::state::Roster;

/// `/mute <player> [duration] [reason...]`
///
/// The second word is always read as the duration; a reason needs one.
pub struct MuteHandler;

#[async_trait]
impl Handler for MuteHandler {
    async fn handle(&self, ctx: &Context<'_>, args: &[&str]) -> HandlerResult {
        ctx.require(Capability::Mute).await?;

        let name = *args
            .first()
            .ok_or(HandlerError::NeedMoreParams("/mute <игрок> [время] [причина]"))?;
        let target = ctx
            .hub
            .sessions
            .find_by_name(name)
            .ok_or_else(|| HandlerError::PlayerNotFound(name.to_string()))?;

        let duration = args.get(1).copied();
        let reason = (args.len() > 2).then(|| args[2..].join(" "));

        let record = ctx
            .hub
            .mutes
            .mute(&target, ctx.principal, duration, reason.as_deref())
            .map_err(|e| e.for_target(&target.name))?;

        ctx.hub.notifier.muted(&record).await;
        Ok(())
    }
}

/// `/unmute <player>`
///
/// Works for offline players through the stored record's name.
pub struct UnmuteHandler;

#[async_trait]
impl Handler for UnmuteHandler {
    async fn handle(&self, ctx: &Context<'_>, args: &[&str]) -> HandlerResult {
        ctx.require(Capability::Unmute).await?;

        let name = *args
            .first()
            .ok_or(HandlerError::NeedMoreParams("/unmute <игрок>"))?;

        let (id, display) = match ctx.hub.sessions.find_by_name(name) {
            Some(online) => (online.id, online.name),
            None => match ctx.hub.mutes.find_by_name(name) {
                Some(record) => (record.principal, record.principal_name),
                None => return Err(HandlerError::PlayerNotFound(name.to_string())),
            },
        };

        let record = ctx
            .hub
            .mutes
            .unmute(&id, ctx.principal)
            .map_err(|e| e.for_target(&display))?;

        ctx.hub.notifier.unmuted(&record, ctx.principal).await;
        Ok(())
    }
}

/// `/mutelist`
pub struct MutelistHandler;

#[async_trait]
impl Handler for MutelistHandler {
    async fn handle(&self, ctx: &Context<'_>, _args: &[&str]) -> HandlerResult {
        ctx.require(Capability::ViewMutes).await?;

        let now = now_millis();
        let active = ctx.hub.mutes.active_at(now);
        if active.is_empty() {
            ctx.reply("&aНет заблокированных игроков");
            return Ok(());
        }

        ctx.reply(&format!("&6Заблокированные игроки ({}):", active.len()));
        for record in &active {
            ctx.reply(&format!(
                "&e{} &7- {} &8({})",
                record.principal_name,
                record.reason,
                format_duration(record.remaining_millis(now)),
            ));
        }
        Ok(())
    }
}
