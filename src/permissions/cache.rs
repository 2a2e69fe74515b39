//! Per-principal permission cache with TTL and external invalidation.
//!
//! Lookups never hold a shard guard across the provider call. Each
//! principal has a generation bumped by `invalidate`, and `invalidate_all`
//! bumps a global epoch. A resolve that started before an invalidation of
//! its principal returns its answer but does not write it back, so at most
//! the one in-flight call observes pre-invalidation data. Invalidating one
//! principal never affects lookups for another.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, warn};

use super::{Capability, PermissionSet};
use crate::config::SharedConfig;
use crate::providers::PermissionProvider;
use crate::state::{DashMapExt, Principal, PrincipalId};

#[derive(Debug, Clone, Copy)]
struct CachedPermissions {
    set: PermissionSet,
    fetched_at: Instant,
}

/// Generates `can_*` projections of [`PermissionCache::resolve`].
macro_rules! impl_capability_checks {
    ($(
        $(#[$meta:meta])*
        $method:ident -> $cap:ident
    ),* $(,)?) => {
        $(
            $(#[$meta])*
            pub async fn $method(&self, principal: &Principal) -> bool {
                self.resolve(principal).await.has(Capability::$cap)
            }
        )*
    };
}

pub struct PermissionCache {
    entries: DashMap<PrincipalId, CachedPermissions>,
    provider: Arc<dyn PermissionProvider>,
    generations: DashMap<PrincipalId, u64>,
    epoch: AtomicU64,
    config: SharedConfig,
}

impl PermissionCache {
    pub fn new(config: SharedConfig, provider: Arc<dyn PermissionProvider>) -> Self {
        Self {
            entries: DashMap::new(),
            provider,
            generations: DashMap::new(),
            epoch: AtomicU64::new(0),
            config,
        }
    }

    /// Capabilities of `principal`, from cache when fresh.
    pub async fn resolve(&self, principal: &Principal) -> PermissionSet {
        self.resolve_at(principal, Instant::now()).await
    }

    pub async fn resolve_at(&self, principal: &Principal, now: Instant) -> PermissionSet {
        let (enable_cache, ttl, debug_logging) = {
            let config = self.config.read();
            (
                config.permissions.enable_cache,
                Duration::from_secs(config.permissions.cache_timeout_secs),
                config.permissions.debug_logging,
            )
        };

        if enable_cache
            && let Some(cached) = self.entries.get_cloned(&principal.id)
            && now.saturating_duration_since(cached.fetched_at) < ttl
        {
            return cached.set;
        }

        let token = self.token(&principal.id);
        let set = match self.provider.permissions(principal).await {
            Ok(set) => set,
            Err(e) => {
                warn!(player = %principal.name, error = %e, "Permission lookup failed, using defaults");
                self.config.read().permissions.defaults
            }
        };

        if debug_logging {
            debug!(player = %principal.name, granted = ?set.granted_nodes(), "Resolved permissions");
        }

        if enable_cache && self.token(&principal.id) == token {
            self.entries.insert(
                principal.id,
                CachedPermissions {
                    set,
                    fetched_at: now,
                },
            );
            // An invalidation that landed between the check and the insert wins.
            if self.token(&principal.id) != token {
                self.entries
                    .remove_if(&principal.id, |_, cached| cached.fetched_at == now);
            }
        }
        set
    }

    /// Epoch and per-principal generation, compared before writing back.
    fn token(&self, id: &PrincipalId) -> (u64, u64) {
        let epoch = self.epoch.load(Ordering::Acquire);
        let generation = self.generations.get(id).map_or(0, |g| *g);
        (epoch, generation)
    }

    /// Whether `principal` holds `cap`.
    pub async fn has(&self, principal: &Principal, cap: Capability) -> bool {
        self.resolve(principal).await.has(cap)
    }

    impl_capability_checks! {
        can_use_global_chat -> ChatGlobal,
        can_use_local_chat -> ChatLocal,
        can_mute -> Mute,
        can_unmute -> Unmute,
        can_reload_config -> ReloadConfig,
        can_view_mutes -> ViewMutes,
        can_bypass_antispam -> BypassAntiSpam,
        can_bypass_mute -> BypassMute,
        can_use_commands -> UseCommands,
        /// Receives staff copies of mute / unmute notices.
        can_receive_mod_notifications -> ReceiveModNotifications,
    }

    /// Drop the cached set for one principal.
    pub fn invalidate(&self, id: &PrincipalId) {
        *self.generations.entry(*id).or_insert(0) += 1;
        self.entries.remove(id);
    }

    /// Drop every cached set.
    pub fn invalidate_all(&self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.generations.clear();
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
