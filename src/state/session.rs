//! Online session registry.
//!
//! The gateway registers one [`Session`] per logged-in connection. The
//! registry is the concrete [`Roster`] and [`Broadcaster`] for the chat core:
//! delivery pushes pre-rendered lines onto each session's bounded outbound
//! queue, and a full queue drops the line instead of stalling the sender.

use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

use super::dashmap_ext::DashMapExt;
use super::{Broadcaster, Position, Principal, PrincipalId, Roster, RosterEntry};
use crate::config::SharedConfig;

/// Why a login was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("name in use")]
    NameInUse,
    #[error("server full")]
    ServerFull,
}

/// One logged-in connection.
#[derive(Debug, Clone)]
pub struct Session {
    pub principal: Principal,
    pub zone: String,
    pub position: Position,
    tx: mpsc::Sender<String>,
}

impl Session {
    fn entry(&self) -> RosterEntry {
        RosterEntry {
            principal: self.principal.clone(),
            zone: self.zone.clone(),
            position: self.position,
        }
    }

    fn deliver(&self, text: &str) -> bool {
        match self.tx.try_send(text.to_string()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                debug!(player = %self.principal.name, "Outbound queue full, dropping line");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

/// Registry of online sessions keyed by principal id.
pub struct SessionRegistry {
    sessions: DashMap<PrincipalId, Session>,
    /// Claimed slots; reserved before the map insert so the cap holds under
    /// concurrent logins.
    slots: AtomicUsize,
    config: SharedConfig,
}

impl SessionRegistry {
    pub fn new(config: SharedConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            slots: AtomicUsize::new(0),
            config,
        }
    }

    /// Register a session and return the receiving end of its outbound queue.
    ///
    /// Ids are derived from the lowercased name, so the id check also
    /// rejects case variants of an online name.
    pub fn register(
        &self,
        principal: Principal,
        zone: impl Into<String>,
        position: Position,
        capacity: usize,
    ) -> Result<mpsc::Receiver<String>, SessionError> {
        let max = self.max_online();
        if self
            .slots
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < max).then_some(n + 1))
            .is_err()
        {
            return Err(SessionError::ServerFull);
        }
        match self.sessions.entry(principal.id) {
            Entry::Occupied(_) => {
                self.slots.fetch_sub(1, Ordering::AcqRel);
                Err(SessionError::NameInUse)
            }
            Entry::Vacant(slot) => {
                let (tx, rx) = mpsc::channel(capacity.max(1));
                slot.insert(Session {
                    principal,
                    zone: zone.into(),
                    position,
                    tx,
                });
                Ok(rx)
            }
        }
    }

    /// Remove a session. Returns the removed principal.
    pub fn remove(&self, id: &PrincipalId) -> Option<Principal> {
        let (_, session) = self.sessions.remove(id)?;
        self.slots.fetch_sub(1, Ordering::AcqRel);
        Some(session.principal)
    }

    /// Move a session. Returns false if it is not online.
    pub fn update_position(&self, id: &PrincipalId, zone: &str, position: Position) -> bool {
        match self.sessions.get_mut(id) {
            Some(mut session) => {
                if session.zone != zone {
                    session.zone = zone.to_string();
                }
                session.position = position;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn recipients(&self) -> Vec<Session> {
        self.sessions.values_cloned()
    }
}

impl Roster for SessionRegistry {
    fn online(&self) -> Vec<RosterEntry> {
        self.sessions.iter().map(|s| s.entry()).collect()
    }

    fn lookup(&self, id: &PrincipalId) -> Option<RosterEntry> {
        self.sessions.get(id).map(|s| s.entry())
    }

    fn find_by_name(&self, name: &str) -> Option<Principal> {
        self.sessions
            .get_cloned(&PrincipalId::from_name(name))
            .map(|s| s.principal)
    }

    fn max_online(&self) -> usize {
        self.config.read().server.max_players
    }

    fn online_count(&self) -> usize {
        self.sessions.len()
    }
}

impl Broadcaster for SessionRegistry {
    fn send_to(&self, id: &PrincipalId, text: &str) -> bool {
        // Clone the sender out so the shard lock is not held during delivery.
        match self.sessions.get_cloned(id) {
            Some(session) => session.deliver(text),
            None => false,
        }
    }

    fn broadcast(&self, text: &str) -> usize {
        self.recipients()
            .iter()
            .filter(|s| s.deliver(text))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn registry(max_players: usize) -> SessionRegistry {
        let mut config = Config::default();
        config.server.max_players = max_players;
        SessionRegistry::new(config.into_shared())
    }

    #[test]
    fn duplicate_name_is_rejected_case_insensitively() {
        let reg = registry(10);
        let _rx = reg
            .register(Principal::new("Steve"), "overworld", Position::default(), 8)
            .unwrap();
        let err = reg
            .register(Principal::new("STEVE"), "overworld", Position::default(), 8)
            .unwrap_err();
        assert_eq!(err, SessionError::NameInUse);
        assert_eq!(reg.find_by_name("steve").unwrap().name, "Steve");
    }

    #[test]
    fn max_players_caps_registration() {
        let reg = registry(1);
        let _rx = reg
            .register(Principal::new("A"), "w", Position::default(), 8)
            .unwrap();
        let err = reg
            .register(Principal::new("B"), "w", Position::default(), 8)
            .unwrap_err();
        assert_eq!(err, SessionError::ServerFull);
    }

    #[test]
    fn concurrent_logins_never_exceed_the_cap() {
        let reg = std::sync::Arc::new(registry(5));
        let handles: Vec<_> = (0..40)
            .map(|i| {
                let reg = reg.clone();
                std::thread::spawn(move || {
                    reg.register(Principal::new(format!("p{i}")), "w", Position::default(), 1)
                        .is_ok()
                })
            })
            .collect();
        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();
        assert_eq!(accepted, 5);
        assert_eq!(reg.len(), 5);

        // A freed slot can be claimed again; a refused duplicate holds none.
        let online: Vec<_> = reg.online().into_iter().map(|e| e.principal).collect();
        reg.remove(&online[0].id).unwrap();
        reg.remove(&online[1].id).unwrap();
        let _late = reg.register(Principal::new("late"), "w", Position::default(), 1).unwrap();
        assert_eq!(
            reg.register(online[2].clone(), "w", Position::default(), 1).unwrap_err(),
            SessionError::NameInUse
        );
        let _later = reg.register(Principal::new("later"), "w", Position::default(), 1).unwrap();
        assert_eq!(
            reg.register(Principal::new("one-too-many"), "w", Position::default(), 1).unwrap_err(),
            SessionError::ServerFull
        );
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let reg = registry(10);
        let steve = Principal::new("Steve");
        let mut rx = reg
            .register(steve.clone(), "w", Position::default(), 1)
            .unwrap();
        assert!(reg.send_to(&steve.id, "first"));
        assert!(!reg.send_to(&steve.id, "second"));
        assert_eq!(rx.try_recv().unwrap(), "first");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn broadcast_reaches_everyone_and_remove_drops_session() {
        let reg = registry(10);
        let a = Principal::new("A");
        let mut rx_a = reg.register(a.clone(), "w", Position::default(), 8).unwrap();
        let mut rx_b = reg
            .register(Principal::new("B"), "nether", Position::default(), 8)
            .unwrap();

        assert_eq!(reg.broadcast("hello"), 2);
        assert_eq!(rx_a.try_recv().unwrap(), "hello");
        assert_eq!(rx_b.try_recv().unwrap(), "hello");

        assert_eq!(reg.remove(&a.id).map(|p| p.name), Some("A".to_string()));
        assert!(reg.lookup(&a.id).is_none());
        assert_eq!(reg.broadcast("again"), 1);
    }

    #[test]
    fn update_position_moves_session() {
        let reg = registry(10);
        let a = Principal::new("A");
        let _rx = reg.register(a.clone(), "w", Position::default(), 8).unwrap();
        assert!(reg.update_position(&a.id, "nether", Position::new(1.0, 2.0, 3.0)));
        let entry = reg.lookup(&a.id).unwrap();
        assert_eq!(entry.zone, "nether");
        assert_eq!(entry.position, Position::new(1.0, 2.0, 3.0));
        assert!(!reg.update_position(&Principal::new("ghost").id, "w", Position::default()));
    }
}
