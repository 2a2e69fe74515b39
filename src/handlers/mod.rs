//! Slash-command handlers.
//!
//! This module contains the Handler trait and command registry for dispatching
//! `/command` lines from logged-in players to the appropriate handler.

mod admin;
mod moderation;
mod session;

pub use admin::NextgenchatHandler;
pub use moderation::{MuteHandler, MutelistHandler, UnmuteHandler};
pub use session::MoveHandler;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::chat::format::colorize;
use crate::error::{HandlerError, HandlerResult};
use crate::hub::Hub;
use crate::permissions::Capability;
use crate::state::{Broadcaster, Principal};

/// Handler context passed to each command handler.
pub struct Context<'a> {
    /// Shared chat components.
    pub hub: &'a Arc<Hub>,
    /// The player issuing the command.
    pub principal: &'a Principal,
    /// Command registry (for usage statistics).
    pub registry: &'a Registry,
}

impl Context<'_> {
    /// Send `text` (with `&` color escapes) to the issuing player.
    pub fn reply(&self, text: &str) {
        self.hub.sessions.send_to(&self.principal.id, &colorize(text));
    }

    /// Fail with [`HandlerError::AccessDenied`] unless the issuer holds `cap`.
    pub async fn require(&self, cap: Capability) -> HandlerResult {
        if self.hub.permissions.has(self.principal, cap).await {
            Ok(())
        } else {
            Err(HandlerError::AccessDenied)
        }
    }
}

/// Trait implemented by all command handlers.
///
/// `args` are the whitespace-separated words after the command name.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &Context<'_>, args: &[&str]) -> HandlerResult;
}

/// Registry of command handlers.
pub struct Registry {
    handlers: HashMap<&'static str, Box<dyn Handler>>,
    /// Command usage counters for `/nextgenchat status`.
    command_counts: HashMap<&'static str, AtomicU64>,
}

impl Registry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut handlers: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();

        // Moderation
        handlers.insert("mute", Box::new(MuteHandler));
        handlers.insert("unmute", Box::new(UnmuteHandler));
        handlers.insert("mutelist", Box::new(MutelistHandler));

        // Administration
        handlers.insert("nextgenchat", Box::new(NextgenchatHandler));

        // Host glue
        handlers.insert("move", Box::new(MoveHandler));

        let command_counts = handlers
            .keys()
            .map(|&cmd| (cmd, AtomicU64::new(0)))
            .collect();

        Self {
            handlers,
            command_counts,
        }
    }

    /// Usage counts of commands used at least once, busiest first.
    pub fn command_stats(&self) -> Vec<(&'static str, u64)> {
        let mut stats: Vec<_> = self
            .command_counts
            .iter()
            .map(|(cmd, count)| (*cmd, count.load(Ordering::Relaxed)))
            .filter(|(_, count)| *count > 0)
            .collect();
        stats.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        stats
    }

    /// Dispatch one command line. A leading `/` is optional.
    pub async fn dispatch(&self, ctx: &Context<'_>, line: &str) -> HandlerResult {
        let mut words = line.trim().trim_start_matches('/').split_whitespace();
        let Some(name) = words.next() else {
            return Err(HandlerError::UnknownCommand(String::new()));
        };
        let args: Vec<&str> = words.collect();
        let cmd_name = name.to_ascii_lowercase();

        match self.handlers.get_key_value(cmd_name.as_str()) {
            Some((key, handler)) => {
                if let Some(counter) = self.command_counts.get(key) {
                    counter.fetch_add(1, Ordering::Relaxed);
                }
                handler.handle(ctx, &args).await
            }
            None => Err(HandlerError::UnknownCommand(cmd_name)),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::moderation::NoOpRepository;
    use crate::providers::Providers;
    use crate::state::Position;

    fn hub() -> Arc<Hub> {
        Arc::new(Hub::new(
            Config::default().into_shared(),
            Providers::none(),
            Arc::new(NoOpRepository),
        ))
    }

    #[tokio::test]
    async fn unknown_command_is_reported_lowercased() {
        let hub = hub();
        let alice = Principal::new("Alice");
        let registry = Registry::new();
        let ctx = Context { hub: &hub, principal: &alice, registry: &registry };

        let err = registry.dispatch(&ctx, "/FROBNICATE x").await.unwrap_err();
        assert!(matches!(err, HandlerError::UnknownCommand(ref c) if c == "frobnicate"));
    }

    #[tokio::test]
    async fn dispatch_counts_usage_case_insensitively() {
        let hub = hub();
        let alice = Principal::new("Alice");
        let _rx = hub
            .sessions
            .register(alice.clone(), "world", Position::default(), 8)
            .unwrap();
        let registry = Registry::new();
        let ctx = Context { hub: &hub, principal: &alice, registry: &registry };

        registry.dispatch(&ctx, "/MOVE world 1 2 3").await.unwrap();
        registry.dispatch(&ctx, "/move world 4 5 6").await.unwrap();

        assert_eq!(registry.command_stats(), vec![("move", 2)]);
    }

    #[tokio::test]
    async fn require_denies_without_capability() {
        let hub = hub();
        let alice = Principal::new("Alice");
        let registry = Registry::new();
        let ctx = Context { hub: &hub, principal: &alice, registry: &registry };

        let err = ctx.require(Capability::Mute).await.unwrap_err();
        assert!(matches!(err, HandlerError::AccessDenied));
    }
}
