//! Hub - the explicitly wired set of chat components.
//!
//! `main` builds exactly one hub; connections and command handlers borrow it
//! through an `Arc`. Components share the live configuration handle, so a
//! reload is a single write-lock swap.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::broadcast::{AutoBroadcaster, DelayedBroadcastQueue, Notifier, PeriodicScheduler};
use crate::chat::{ChatRouter, SpamGuard};
use crate::config::{Config, ConfigError, SharedConfig, ValidationError, validate};
use crate::moderation::{MuteRepository, MuteStore};
use crate::permissions::PermissionCache;
use crate::providers::{IdentityProvider, Providers};
use crate::state::SessionRegistry;

/// Why `/nextgenchat reload` failed. The running configuration is kept.
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("no configuration file to reload from")]
    NoPath,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{} validation error(s), first: {}", .0.len(), .0.first().map(|e| e.to_string()).unwrap_or_default())]
    Invalid(Vec<ValidationError>),
}

pub struct Hub {
    pub config: SharedConfig,
    config_path: Option<PathBuf>,
    pub sessions: Arc<SessionRegistry>,
    pub mutes: Arc<MuteStore>,
    pub permissions: Arc<PermissionCache>,
    pub identity: Arc<dyn IdentityProvider>,
    pub queue: Arc<DelayedBroadcastQueue>,
    pub rotation: Arc<AutoBroadcaster>,
    pub router: ChatRouter,
    pub notifier: Notifier,
    pub scheduler: Arc<PeriodicScheduler>,
}

impl Hub {
    /// Wire every component around one shared configuration handle.
    pub fn new(config: SharedConfig, providers: Providers, repository: Arc<dyn MuteRepository>) -> Self {
        let sessions = Arc::new(SessionRegistry::new(Arc::clone(&config)));
        let mutes = Arc::new(MuteStore::new(Arc::clone(&config), repository));
        let permissions = Arc::new(PermissionCache::new(
            Arc::clone(&config),
            providers.permissions,
        ));
        let identity = providers.identity;
        let queue = Arc::new(DelayedBroadcastQueue::new());
        let rotation = Arc::new(AutoBroadcaster::new(Arc::clone(&config)));
        let spam = Arc::new(SpamGuard::new());

        let router = ChatRouter::new(
            Arc::clone(&config),
            Arc::clone(&mutes),
            Arc::clone(&permissions),
            Arc::clone(&identity),
            sessions.clone(),
            sessions.clone(),
            spam,
        );
        let notifier = Notifier::new(
            Arc::clone(&config),
            Arc::clone(&queue),
            Arc::clone(&permissions),
            Arc::clone(&identity),
            sessions.clone(),
            sessions.clone(),
        );
        let scheduler = Arc::new(PeriodicScheduler::new(
            Arc::clone(&config),
            Arc::clone(&queue),
            Arc::clone(&rotation),
            Arc::clone(&mutes),
            sessions.clone(),
            sessions.clone(),
        ));

        Self {
            config,
            config_path: None,
            sessions,
            mutes,
            permissions,
            identity,
            queue,
            rotation,
            router,
            notifier,
            scheduler,
        }
    }

    /// Remember where the configuration came from so it can be reloaded.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    /// Re-read the configuration file and swap it in.
    ///
    /// The listener address and the provider selection are fixed at startup;
    /// everything else takes effect on the next read. Cached permission sets
    /// are dropped.
    pub fn reload(&self) -> Result<(), ReloadError> {
        let path = self.config_path.as_ref().ok_or(ReloadError::NoPath)?;
        let fresh = Config::load(path)?;
        validate(&fresh).map_err(ReloadError::Invalid)?;

        *self.config.write() = fresh;
        self.permissions.invalidate_all();
        info!(path = %path.display(), "Configuration reloaded");
        Ok(())
    }

    /// Flip autobroadcast on or off in the running configuration.
    pub fn toggle_auto_broadcast(&self) -> bool {
        let mut config = self.config.write();
        config.auto_broadcast.enabled = !config.auto_broadcast.enabled;
        config.auto_broadcast.enabled
    }
}
