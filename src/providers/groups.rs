//! Group directory provider backed by `[[groups]]` in the live config.
//!
//! A principal belongs to every group listing its name (case-insensitive)
//! plus every `default = true` group. Permissions are the union of the
//! groups' nodes; prefix, suffix and group name come from the group with
//! the highest weight.

use async_trait::async_trait;

use super::{Identity, IdentityProvider, PermissionProvider, ProviderError};
use crate::config::{GroupConfig, SharedConfig};
use crate::permissions::PermissionSet;
use crate::state::Principal;

pub struct GroupDirectory {
    config: SharedConfig,
}

impl GroupDirectory {
    pub fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    /// Groups that apply to `name`, highest weight first.
    fn groups_for(&self, name: &str) -> Vec<GroupConfig> {
        let config = self.config.read();
        let mut groups: Vec<GroupConfig> = config
            .groups
            .iter()
            .filter(|g| g.default || g.members.iter().any(|m| m.eq_ignore_ascii_case(name)))
            .cloned()
            .collect();
        // Stable sort keeps file order among equal weights.
        groups.sort_by(|a, b| b.weight.cmp(&a.weight));
        groups
    }
}

#[async_trait]
impl PermissionProvider for GroupDirectory {
    async fn permissions(&self, principal: &Principal) -> Result<PermissionSet, ProviderError> {
        let groups = self.groups_for(&principal.name);
        if groups.is_empty() {
            return Err(ProviderError::UnknownPrincipal);
        }
        Ok(PermissionSet::from_nodes(
            groups.iter().flat_map(|g| g.permissions.iter().map(String::as_str)),
        ))
    }
}

#[async_trait]
impl IdentityProvider for GroupDirectory {
    async fn identity(&self, principal: &Principal) -> Result<Identity, ProviderError> {
        let primary = self
            .groups_for(&principal.name)
            .into_iter()
            .next()
            .ok_or(ProviderError::UnknownPrincipal)?;
        Ok(Identity {
            prefix: primary.prefix,
            suffix: primary.suffix,
            group: primary.name,
        })
    }
}
