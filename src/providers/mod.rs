//! Permission and identity provider abstraction.
//!
//! Providers are optional external capabilities. The daemon picks one
//! implementation at startup from `providers.kind`; callers only ever see
//! the traits and absorb [`ProviderError`] into fallbacks.

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::SharedConfig;
use crate::permissions::PermissionSet;
use crate::state::Principal;

pub use crate::error::ProviderError;

pub mod groups;
pub mod noop;

pub use groups::GroupDirectory;
pub use noop::NoProvider;

/// Display decorations for a principal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Identity {
    pub prefix: String,
    pub suffix: String,
    pub group: String,
}

#[async_trait]
pub trait PermissionProvider: Send + Sync {
    /// Capabilities granted to `principal`.
    async fn permissions(&self, principal: &Principal) -> Result<PermissionSet, ProviderError>;
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Prefix, suffix and primary group of `principal`.
    async fn identity(&self, principal: &Principal) -> Result<Identity, ProviderError>;
}

/// The selected provider pair.
#[derive(Clone)]
pub struct Providers {
    pub permissions: Arc<dyn PermissionProvider>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl Providers {
    /// Build the providers named by `providers.kind`.
    pub fn from_config(config: &SharedConfig) -> Self {
        let kind = config.read().providers.kind.clone();
        match kind.as_str() {
            "groups" => {
                let directory = Arc::new(GroupDirectory::new(Arc::clone(config)));
                Self {
                    permissions: directory.clone(),
                    identity: directory,
                }
            }
            _ => Self::none(),
        }
    }

    /// Providers that always fail, so configured defaults apply.
    pub fn none() -> Self {
        Self {
            permissions: Arc::new(NoProvider),
            identity: Arc::new(NoProvider),
        }
    }
}
