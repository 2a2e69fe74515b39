//! Administrative command: `/nextgenchat [help|status|reload|broadcast ...]`.

use async_trait::async_trait;
use tracing::{info, warn};

use super::{Context, Handler};
use crate::error::{HandlerError, HandlerResult};
use crate::permissions::Capability;

const HELP: &[&str] = &[
    "&6=== NextGenChat ===",
    "&e/nextgenchat help &7- эта справка",
    "&e/nextgenchat status &7- состояние сервера чата",
    "&e/nextgenchat reload &7- перезагрузить конфигурацию",
    "&e/nextgenchat broadcast &7- отправить автобродкаст сейчас",
    "&e/nextgenchat broadcast toggle &7- включить/выключить автобродкаст",
    "&e/nextgenchat broadcast status &7- состояние автобродкаста",
    "&e/mute <игрок> [время] [причина] &7- заблокировать чат",
    "&e/unmute <игрок> &7- разблокировать чат",
    "&e/mutelist &7- список блокировок",
];

pub struct NextgenchatHandler;

#[async_trait]
impl Handler for NextgenchatHandler {
    async fn handle(&self, ctx: &Context<'_>, args: &[&str]) -> HandlerResult {
        let sub = args.first().map(|s| s.to_ascii_lowercase());
        match sub.as_deref() {
            None | Some("help") => help(ctx).await,
            Some("status") => status(ctx).await,
            Some("reload") => reload(ctx).await,
            Some("broadcast") => broadcast(ctx, args.get(1).copied()).await,
            Some(_) => Err(HandlerError::NeedMoreParams(
                "/nextgenchat [help|status|reload|broadcast [toggle|status]]",
            )),
        }
    }
}

async fn help(ctx: &Context<'_>) -> HandlerResult {
    ctx.require(Capability::UseCommands).await?;
    for line in HELP {
        ctx.reply(line);
    }
    Ok(())
}

async fn status(ctx: &Context<'_>) -> HandlerResult {
    ctx.require(Capability::UseCommands).await?;
    let hub = ctx.hub;
    let (name, max_players) = {
        let config = hub.config.read();
        (config.server.name.clone(), config.server.max_players)
    };

    ctx.reply(&format!("&6=== {name} ==="));
    ctx.reply(&format!("&7Онлайн: &f{}/{}", hub.sessions.len(), max_players));
    ctx.reply(&format!("&7Активные блокировки: &f{}", hub.mutes.active().len()));
    ctx.reply(&format!("&7Кэш прав: &f{}", hub.permissions.len()));
    ctx.reply(&format!("&7Очередь уведомлений: &f{}", hub.queue.len()));
    ctx.reply(&format!("&7Тиков: &f{}", hub.scheduler.ticks()));

    let stats = ctx.registry.command_stats();
    if !stats.is_empty() {
        let summary = stats
            .iter()
            .map(|(cmd, count)| format!("{cmd}={count}"))
            .collect::<Vec<_>>()
            .join(", ");
        ctx.reply(&format!("&7Команды: &f{summary}"));
    }
    Ok(())
}

async fn reload(ctx: &Context<'_>) -> HandlerResult {
    ctx.require(Capability::ReloadConfig).await?;
    match ctx.hub.reload() {
        Ok(()) => {
            info!(player = %ctx.principal.name, "Configuration reload requested");
            ctx.reply("&aКонфигурация перезагружена");
            Ok(())
        }
        Err(e) => {
            warn!(player = %ctx.principal.name, error = %e, "Configuration reload failed");
            Err(HandlerError::Reload(e.to_string()))
        }
    }
}

async fn broadcast(ctx: &Context<'_>, action: Option<&str>) -> HandlerResult {
    let action = action.map(str::to_ascii_lowercase);
    match action.as_deref() {
        None => {
            ctx.require(Capability::ReloadConfig).await?;
            if ctx.hub.scheduler.fire_broadcast_now() {
                ctx.reply("&aАвтобродкаст отправлен");
            } else {
                ctx.reply("&cНет сообщений для автобродкаста");
            }
            Ok(())
        }
        Some("toggle") => {
            ctx.require(Capability::ReloadConfig).await?;
            let enabled = ctx.hub.toggle_auto_broadcast();
            info!(player = %ctx.principal.name, enabled, "Autobroadcast toggled");
            if enabled {
                ctx.reply("&aАвтобродкаст включен");
            } else {
                ctx.reply("&cАвтобродкаст выключен");
            }
            Ok(())
        }
        Some("status") => {
            ctx.require(Capability::UseCommands).await?;
            let (enabled, interval, count) = {
                let config = ctx.hub.config.read();
                let rotation = &config.auto_broadcast;
                (rotation.enabled, rotation.interval_secs, rotation.messages.len())
            };
            let state = if enabled { "&aвключен" } else { "&cвыключен" };
            ctx.reply(&format!("&7Автобродкаст: {state}"));
            ctx.reply(&format!("&7Интервал: &f{interval}с"));
            ctx.reply(&format!("&7Сообщений: &f{count}"));
            ctx.reply(&format!("&7Следующее: &f#{}", ctx.hub.rotation.current_index() + 1));
            Ok(())
        }
        Some(_) => Err(HandlerError::NeedMoreParams("/nextgenchat broadcast [toggle|status]")),
    }
}
