//! Provider used when no permission system is configured.
//!
//! Every lookup fails with [`ProviderError::Unavailable`], so the cache
//! falls back to `permissions.defaults` and identity placeholders render
//! empty.

use async_trait::async_trait;

use super::{Identity, IdentityProvider, PermissionProvider, ProviderError};
use crate::permissions::PermissionSet;
use crate::state::Principal;

#[derive(Debug, Default, Clone, Copy)]
pub struct NoProvider;

#[async_trait]
impl PermissionProvider for NoProvider {
    async fn permissions(&self, _principal: &Principal) -> Result<PermissionSet, ProviderError> {
        Err(ProviderError::Unavailable)
    }
}

#[async_trait]
impl IdentityProvider for NoProvider {
    async fn identity(&self, _principal: &Principal) -> Result<Identity, ProviderError> {
        Err(ProviderError::Unavailable)
    }
}
