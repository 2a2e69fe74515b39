//! Template rendering: placeholders, identity decorations and colors.

use std::time::Duration;

use tracing::debug;

use crate::providers::{Identity, IdentityProvider};
use crate::state::Principal;

/// Section sign used by clients as the color-code escape.
pub const COLOR_CHAR: char = '§';

/// Turn `&` color escapes into `§` codes.
pub fn colorize(text: &str) -> String {
    text.replace('&', &COLOR_CHAR.to_string())
}

/// Fill the identity placeholders (`%prefix%`, `%suffix%`, `%group%`,
/// `%player%`, `%player_name%`, `%player_displayname%`).
pub fn apply_identity(text: &str, principal: &Principal, identity: &Identity) -> String {
    text.replace("%prefix%", &identity.prefix)
        .replace("%suffix%", &identity.suffix)
        .replace("%group%", &identity.group)
        .replace("%player_displayname%", &principal.name)
        .replace("%player_name%", &principal.name)
        .replace("%player%", &principal.name)
}

/// Render a chat line: `{player}` and `{message}`, then identity, then colors.
pub fn render_chat(template: &str, principal: &Principal, message: &str, identity: &Identity) -> String {
    let filled = template
        .replace("{player}", &principal.name)
        .replace("{message}", message);
    colorize(&apply_identity(&filled, principal, identity))
}

/// Render a notice about `principal`: `{player}`, identity, colors.
pub fn render_notice(template: &str, principal: &Principal, identity: &Identity) -> String {
    let filled = template.replace("{player}", &principal.name);
    colorize(&apply_identity(&filled, principal, identity))
}

/// Look up `principal`'s identity within `timeout`.
///
/// Failures and timeouts yield an empty identity.
pub async fn lookup_identity(
    provider: &dyn IdentityProvider,
    principal: &Principal,
    timeout: Duration,
) -> Identity {
    match tokio::time::timeout(timeout, provider.identity(principal)).await {
        Ok(Ok(identity)) => identity,
        Ok(Err(e)) => {
            debug!(player = %principal.name, error = %e, "Identity lookup failed");
            Identity::default()
        }
        Err(_) => {
            debug!(player = %principal.name, "Identity lookup timed out");
            Identity::default()
        }
    }
}
