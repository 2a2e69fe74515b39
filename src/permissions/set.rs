//! Capability sets and their permission nodes.

use serde::Deserialize;

/// Named capability, one per [`PermissionSet`] field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ChatGlobal,
    ChatLocal,
    Mute,
    Unmute,
    ReloadConfig,
    ViewMutes,
    BypassAntiSpam,
    BypassMute,
    UseCommands,
    ReceiveModNotifications,
}

impl Capability {
    pub const ALL: [Capability; 10] = [
        Capability::ChatGlobal,
        Capability::ChatLocal,
        Capability::Mute,
        Capability::Unmute,
        Capability::ReloadConfig,
        Capability::ViewMutes,
        Capability::BypassAntiSpam,
        Capability::BypassMute,
        Capability::UseCommands,
        Capability::ReceiveModNotifications,
    ];

    /// Permission node checked against provider grants.
    pub fn node(&self) -> &'static str {
        match self {
            Self::ChatGlobal => "nextgenchat.chat.global",
            Self::ChatLocal => "nextgenchat.chat.local",
            Self::Mute => "nextgenchat.moderate.mute",
            Self::Unmute => "nextgenchat.moderate.unmute",
            Self::ReloadConfig => "nextgenchat.admin.reload",
            Self::ViewMutes => "nextgenchat.moderate.view",
            Self::BypassAntiSpam => "nextgenchat.bypass.antispam",
            Self::BypassMute => "nextgenchat.bypass.mute",
            Self::UseCommands => "nextgenchat.commands",
            Self::ReceiveModNotifications => "nextgenchat.notifications.moderation",
        }
    }
}

/// Resolved capabilities of one principal.
///
/// Deserialized from `[permissions.defaults]`; absent keys are `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PermissionSet {
    pub chat_global: bool,
    pub chat_local: bool,
    pub mute: bool,
    pub unmute: bool,
    pub reload_config: bool,
    pub view_mutes: bool,
    pub bypass_antispam: bool,
    pub bypass_mute: bool,
    pub use_commands: bool,
    pub receive_mod_notifications: bool,
}

impl PermissionSet {
    /// Every capability granted.
    pub fn all() -> Self {
        let mut set = Self::default();
        for cap in Capability::ALL {
            set.set(cap, true);
        }
        set
    }

    pub fn has(&self, cap: Capability) -> bool {
        match cap {
            Capability::ChatGlobal => self.chat_global,
            Capability::ChatLocal => self.chat_local,
            Capability::Mute => self.mute,
            Capability::Unmute => self.unmute,
            Capability::ReloadConfig => self.reload_config,
            Capability::ViewMutes => self.view_mutes,
            Capability::BypassAntiSpam => self.bypass_antispam,
            Capability::BypassMute => self.bypass_mute,
            Capability::UseCommands => self.use_commands,
            Capability::ReceiveModNotifications => self.receive_mod_notifications,
        }
    }

    pub fn set(&mut self, cap: Capability, value: bool) {
        let slot = match cap {
            Capability::ChatGlobal => &mut self.chat_global,
            Capability::ChatLocal => &mut self.chat_local,
            Capability::Mute => &mut self.mute,
            Capability::Unmute => &mut self.unmute,
            Capability::ReloadConfig => &mut self.reload_config,
            Capability::ViewMutes => &mut self.view_mutes,
            Capability::BypassAntiSpam => &mut self.bypass_antispam,
            Capability::BypassMute => &mut self.bypass_mute,
            Capability::UseCommands => &mut self.use_commands,
            Capability::ReceiveModNotifications => &mut self.receive_mod_notifications,
        };
        *slot = value;
    }

    /// Build a set from granted permission nodes.
    ///
    /// A grant matches a node exactly, or as `prefix.*` covering every node
    /// under `prefix.`; a bare `*` grants everything.
    pub fn from_nodes<'a, I>(grants: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let grants: Vec<&str> = grants.into_iter().map(str::trim).collect();
        let mut set = Self::default();
        for cap in Capability::ALL {
            let node = cap.node();
            if grants.iter().any(|grant| node_matches(grant, node)) {
                set.set(cap, true);
            }
        }
        set
    }

    /// Nodes of the granted capabilities, for debug output.
    pub fn granted_nodes(&self) -> Vec<&'static str> {
        Capability::ALL
            .iter()
            .filter(|cap| self.has(**cap))
            .map(Capability::node)
            .collect()
    }
}

fn node_matches(grant: &str, node: &str) -> bool {
    if grant == "*" || grant.eq_ignore_ascii_case(node) {
        return true;
    }
    match grant.strip_suffix(".*") {
        Some(prefix) => node
            .get(..prefix.len() + 1)
            .is_some_and(|head| head.eq_ignore_ascii_case(&format!("{prefix}."))),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_grants_subtree_only() {
        let set = PermissionSet::from_nodes(["nextgenchat.moderate.*"]);
        assert!(set.mute && set.unmute && set.view_mutes);
        assert!(!set.chat_global);
        assert!(!set.reload_config);
    }

    #[test]
    fn exact_and_root_grants() {
        let set = PermissionSet::from_nodes(["nextgenchat.chat.local", "nextgenchat.commands"]);
        assert_eq!(set.granted_nodes(), vec!["nextgenchat.chat.local", "nextgenchat.commands"]);
        assert_eq!(PermissionSet::from_nodes(["nextgenchat.*"]), PermissionSet::all());
        assert_eq!(PermissionSet::from_nodes(["*"]), PermissionSet::all());
    }

    #[test]
    fn partial_segment_is_not_a_match() {
        // "nextgenchat.chat.glob.*" must not cover "nextgenchat.chat.global"
        let set = PermissionSet::from_nodes(["nextgenchat.chat.glob.*", "nextgenchat.chat"]);
        assert_eq!(set, PermissionSet::default());
    }
}
