//! Host collaborator interfaces: who is online and how to reach them.

use super::{Principal, PrincipalId, RosterEntry};

/// Read-only view of the online players.
pub trait Roster: Send + Sync {
    /// Snapshot of every online session.
    fn online(&self) -> Vec<RosterEntry>;

    /// Current entry for `id`, if online.
    fn lookup(&self, id: &PrincipalId) -> Option<RosterEntry>;

    /// Case-insensitive lookup by display name.
    fn find_by_name(&self, name: &str) -> Option<Principal>;

    /// Configured player capacity.
    fn max_online(&self) -> usize;

    fn online_count(&self) -> usize {
        self.online().len()
    }
}

/// Delivery primitive. Text is already colorized.
pub trait Broadcaster: Send + Sync {
    /// Deliver to one principal. Returns false if it was not delivered.
    fn send_to(&self, id: &PrincipalId, text: &str) -> bool;

    /// Deliver to every online principal. Returns the number reached.
    fn broadcast(&self, text: &str) -> usize;
}
