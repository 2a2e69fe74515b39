//! Expiring mute registry.
//!
//! # Expiry
//!
//! A record is expired once `now > start + duration`. Expired records are
//! removed by three paths:
//!
//! - [`MuteStore::is_muted`] purges lazily (and persists)
//! - [`MuteStore::sweep_expired`] purges in bulk from the scheduler
//! - [`MuteStore::mute`] / [`MuteStore::unmute`] treat them as absent
//!
//! [`MuteStore::get`] never purges. Display callers compute the remaining
//! time from the returned record themselves.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::duration::parse_duration;
use super::persistence::MuteRepository;
use crate::config::SharedConfig;
use crate::error::{MuteError, PersistenceError};
use crate::state::{DashMapExt, Principal, PrincipalId};

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// One active (or expired but not yet purged) mute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MuteRecord {
    pub principal: PrincipalId,
    pub principal_name: String,
    pub moderator: PrincipalId,
    pub moderator_name: String,
    pub start_epoch_millis: i64,
    pub duration_millis: i64,
    pub reason: String,
}

impl MuteRecord {
    pub fn new(
        target: &Principal,
        moderator: &Principal,
        start_epoch_millis: i64,
        duration_millis: i64,
        reason: String,
    ) -> Self {
        Self {
            principal: target.id,
            principal_name: target.name.clone(),
            moderator: moderator.id,
            moderator_name: moderator.name.clone(),
            start_epoch_millis,
            duration_millis,
            reason,
        }
    }

    pub fn expires_at_millis(&self) -> i64 {
        self.start_epoch_millis.saturating_add(self.duration_millis)
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.expires_at_millis()
    }

    /// Milliseconds left at `now`, never negative.
    pub fn remaining_millis(&self, now: i64) -> i64 {
        self.expires_at_millis().saturating_sub(now).max(0)
    }
}

/// Registry of mutes keyed by principal.
pub struct MuteStore {
    records: DashMap<PrincipalId, MuteRecord>,
    repository: Arc<dyn MuteRepository>,
    /// Serialises snapshot + save so concurrent mutations persist in order.
    persist_lock: Mutex<()>,
    config: SharedConfig,
}

impl MuteStore {
    pub fn new(config: SharedConfig, repository: Arc<dyn MuteRepository>) -> Self {
        Self {
            records: DashMap::new(),
            repository,
            persist_lock: Mutex::new(()),
            config,
        }
    }

    fn enabled(&self) -> bool {
        self.config.read().moderation.enable_moderation
    }

    fn log_actions(&self) -> bool {
        self.config.read().moderation.log_mute_actions
    }

    /// Load persisted records, dropping those already expired.
    ///
    /// Returns the number of active records loaded.
    pub fn load(&self) -> Result<usize, PersistenceError> {
        self.load_at(now_millis())
    }

    pub fn load_at(&self, now: i64) -> Result<usize, PersistenceError> {
        let records = self.repository.load_all()?;
        let total = records.len();
        let mut loaded = 0;
        for record in records {
            if record.duration_millis <= 0 || record.is_expired_at(now) {
                continue;
            }
            self.records.insert(record.principal, record);
            loaded += 1;
        }
        if loaded < total {
            debug!(dropped = total - loaded, "Dropped expired mute records on load");
            self.persist();
        }
        Ok(loaded)
    }

    /// Mute `target` for `duration_spec` (or the configured default).
    pub fn mute(
        &self,
        target: &Principal,
        moderator: &Principal,
        duration_spec: Option<&str>,
        reason: Option<&str>,
    ) -> Result<MuteRecord, MuteError> {
        self.mute_at(target, moderator, duration_spec, reason, now_millis())
    }

    pub fn mute_at(
        &self,
        target: &Principal,
        moderator: &Principal,
        duration_spec: Option<&str>,
        reason: Option<&str>,
        now: i64,
    ) -> Result<MuteRecord, MuteError> {
        let (default_duration, default_reason) = {
            let config = self.config.read();
            if !config.moderation.enable_moderation {
                return Err(MuteError::ModerationDisabled);
            }
            (
                config.moderation.default_mute_duration.clone(),
                config.moderation.default_reason.clone(),
            )
        };

        let spec = duration_spec
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(default_duration.as_str());
        let duration = parse_duration(spec).ok_or(MuteError::InvalidDuration)?;
        let reason = reason
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or(default_reason);

        let record = MuteRecord::new(target, moderator, now, duration, reason);

        match self.records.entry(target.id) {
            Entry::Occupied(mut slot) => {
                if !slot.get().is_expired_at(now) {
                    return Err(MuteError::AlreadyMuted);
                }
                slot.insert(record.clone());
            }
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
            }
        }

        self.persist();
        Ok(record)
    }

    /// Lift the mute on `target`.
    pub fn unmute(&self, target: &PrincipalId, moderator: &Principal) -> Result<MuteRecord, MuteError> {
        self.unmute_at(target, moderator, now_millis())
    }

    pub fn unmute_at(
        &self,
        target: &PrincipalId,
        moderator: &Principal,
        now: i64,
    ) -> Result<MuteRecord, MuteError> {
        if !self.enabled() {
            return Err(MuteError::ModerationDisabled);
        }
        let Some((_, record)) = self.records.remove(target) else {
            return Err(MuteError::NotMuted);
        };
        self.persist();
        if record.is_expired_at(now) {
            return Err(MuteError::NotMuted);
        }
        debug!(player = %record.principal_name, moderator = %moderator.name, "Mute lifted");
        Ok(record)
    }

    /// Whether `id` is currently muted. Purges an expired record.
    pub fn is_muted(&self, id: &PrincipalId) -> bool {
        self.is_muted_at(id, now_millis())
    }

    pub fn is_muted_at(&self, id: &PrincipalId, now: i64) -> bool {
        if !self.enabled() {
            return false;
        }
        if let Some((_, expired)) = self.records.remove_if(id, |_, r| r.is_expired_at(now)) {
            self.persist();
            if self.log_actions() {
                info!(player = %expired.principal_name, "Mute expired");
            }
            return false;
        }
        self.records.contains_key(id)
    }

    /// Record for `id`, expired or not. No side effects.
    pub fn get(&self, id: &PrincipalId) -> Option<MuteRecord> {
        self.records.get_cloned(id)
    }

    /// Remove every expired record. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(now_millis())
    }

    pub fn sweep_expired_at(&self, now: i64) -> usize {
        let removed: Vec<MuteRecord> = self
            .records
            .keys_where(|r| r.is_expired_at(now))
            .iter()
            .filter_map(|id| self.records.remove_if(id, |_, r| r.is_expired_at(now)))
            .map(|(_, r)| r)
            .collect();

        if !removed.is_empty() {
            self.persist();
            if self.log_actions() {
                for record in &removed {
                    info!(player = %record.principal_name, "Mute expired");
                }
            }
        }
        removed.len()
    }

    /// Unexpired records sorted by name.
    pub fn active(&self) -> Vec<MuteRecord> {
        self.active_at(now_millis())
    }

    pub fn active_at(&self, now: i64) -> Vec<MuteRecord> {
        let mut records: Vec<MuteRecord> = self
            .records
            .values_cloned()
            .into_iter()
            .filter(|r| !r.is_expired_at(now))
            .collect();
        records.sort_by_key(|r| r.principal_name.to_lowercase());
        records
    }

    /// Case-insensitive lookup by the recorded display name.
    pub fn find_by_name(&self, name: &str) -> Option<MuteRecord> {
        let wanted = name.to_lowercase();
        self.records
            .find_cloned(|r| r.principal_name.to_lowercase() == wanted)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Write the current records straight to `repository`, bypassing the
    /// configured one. Used for the final save on shutdown.
    pub fn save_to(&self, repository: &dyn MuteRepository) -> Result<usize, PersistenceError> {
        let _guard = self.persist_lock.lock();
        let snapshot = self.snapshot();
        repository.save_all(&snapshot)?;
        Ok(snapshot.len())
    }

    fn persist(&self) {
        let _guard = self.persist_lock.lock();
        if let Err(e) = self.repository.save_all(&self.snapshot()) {
            warn!(error = %e, "Failed to persist mute data");
        }
    }

    fn snapshot(&self) -> Vec<MuteRecord> {
        let mut snapshot = self.records.values_cloned();
        snapshot.sort_by(|a, b| {
            a.start_epoch_millis
                .cmp(&b.start_epoch_millis)
                .then_with(|| a.principal_name.cmp(&b.principal_name))
        });
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    /// Repository that remembers every snapshot it was handed.
    #[derive(Default)]
    struct RecordingRepository {
        initial: Vec<MuteRecord>,
        saves: Mutex<Vec<Vec<MuteRecord>>>,
    }

    impl MuteRepository for RecordingRepository {
        fn load_all(&self) -> Result<Vec<MuteRecord>, PersistenceError> {
            Ok(self.initial.clone())
        }

        fn save_all(&self, records: &[MuteRecord]) -> Result<(), PersistenceError> {
            self.saves.lock().push(records.to_vec());
            Ok(())
        }
    }

    const T0: i64 = 1_700_000_000_000;
    const HOUR: i64 = 3_600_000;

    fn store_with(config: Config) -> (MuteStore, Arc<RecordingRepository>) {
        let repo = Arc::new(RecordingRepository::default());
        (MuteStore::new(config.into_shared(), repo.clone()), repo)
    }

    fn store() -> (MuteStore, Arc<RecordingRepository>) {
        store_with(Config::default())
    }

    fn steve() -> Principal {
        Principal::new("Steve")
    }

    fn moderator() -> Principal {
        Principal::new("Mod")
    }

    #[test]
    fn mute_then_is_muted_then_expiry() {
        let (store, repo) = store();
        let record = store
            .mute_at(&steve(), &moderator(), Some("1h"), Some("spam"), T0)
            .unwrap();
        assert_eq!(record.duration_millis, HOUR);
        assert_eq!(record.reason, "spam");
        assert_eq!(repo.saves.lock().len(), 1);

        assert!(store.is_muted_at(&steve().id, T0 + HOUR));
        assert!(!store.is_muted_at(&steve().id, T0 + HOUR + 1));
        // lazy expiry removed and persisted the record
        assert!(store.get(&steve().id).is_none());
        assert_eq!(repo.saves.lock().len(), 2);
        assert!(repo.saves.lock()[1].is_empty());
    }

    #[test]
    fn second_mute_is_rejected_until_expired() {
        let (store, _) = store();
        store.mute_at(&steve(), &moderator(), Some("1h"), None, T0).unwrap();
        let err = store
            .mute_at(&steve(), &moderator(), Some("2h"), None, T0 + 10)
            .unwrap_err();
        assert_eq!(err, MuteError::AlreadyMuted);

        let replaced = store
            .mute_at(&steve(), &moderator(), Some("2h"), None, T0 + HOUR + 1)
            .unwrap();
        assert_eq!(replaced.duration_millis, 2 * HOUR);
        assert_eq!(store.get(&steve().id).unwrap().duration_millis, 2 * HOUR);
    }

    #[test]
    fn empty_spec_and_reason_use_configured_defaults() {
        let mut config = Config::default();
        config.moderation.default_mute_duration = "30m".into();
        config.moderation.default_reason = "flood".into();
        let (store, _) = store_with(config);

        let record = store.mute_at(&steve(), &moderator(), Some("  "), None, T0).unwrap();
        assert_eq!(record.duration_millis, 30 * 60_000);
        assert_eq!(record.reason, "flood");
    }

    #[test]
    fn invalid_duration_stores_nothing() {
        let (store, repo) = store();
        for spec in ["0m", "10x", "abc"] {
            let err = store
                .mute_at(&steve(), &moderator(), Some(spec), None, T0)
                .unwrap_err();
            assert_eq!(err, MuteError::InvalidDuration);
        }
        assert!(store.is_empty());
        assert!(repo.saves.lock().is_empty());
    }

    #[test]
    fn unmute_of_expired_record_is_not_muted_and_purges() {
        let (store, repo) = store();
        store.mute_at(&steve(), &moderator(), Some("1m"), None, T0).unwrap();
        let err = store
            .unmute_at(&steve().id, &moderator(), T0 + 60_001)
            .unwrap_err();
        assert_eq!(err, MuteError::NotMuted);
        assert!(store.is_empty());
        assert_eq!(repo.saves.lock().len(), 2);

        let err = store.unmute_at(&steve().id, &moderator(), T0).unwrap_err();
        assert_eq!(err, MuteError::NotMuted);
    }

    #[test]
    fn unmute_returns_removed_record() {
        let (store, _) = store();
        store.mute_at(&steve(), &moderator(), Some("1d"), Some("caps"), T0).unwrap();
        let record = store.unmute_at(&steve().id, &moderator(), T0 + 5).unwrap();
        assert_eq!(record.reason, "caps");
        assert!(!store.is_muted_at(&steve().id, T0 + 6));
    }

    #[test]
    fn get_does_not_purge_expired_record() {
        let (store, repo) = store();
        store.mute_at(&steve(), &moderator(), Some("1m"), None, T0).unwrap();
        let record = store.get(&steve().id).unwrap();
        assert!(record.is_expired_at(T0 + 60_001));
        assert_eq!(record.remaining_millis(T0 + 60_001), 0);
        assert!(store.get(&steve().id).is_some());
        assert_eq!(repo.saves.lock().len(), 1);
    }

    #[test]
    fn sweep_persists_once_and_only_when_something_expired() {
        let (store, repo) = store();
        store.mute_at(&Principal::new("A"), &moderator(), Some("1m"), None, T0).unwrap();
        store.mute_at(&Principal::new("B"), &moderator(), Some("1m"), None, T0).unwrap();
        store.mute_at(&Principal::new("C"), &moderator(), Some("1w"), None, T0).unwrap();
        assert_eq!(repo.saves.lock().len(), 3);

        assert_eq!(store.sweep_expired_at(T0 + 1_000), 0);
        assert_eq!(repo.saves.lock().len(), 3);

        assert_eq!(store.sweep_expired_at(T0 + 2 * 60_000), 2);
        assert_eq!(repo.saves.lock().len(), 4);
        assert_eq!(store.len(), 1);
        assert_eq!(repo.saves.lock()[3][0].principal_name, "C");
    }

    #[test]
    fn disabled_moderation_refuses_and_reports_unmuted() {
        let (store, _) = store();
        store.mute_at(&steve(), &moderator(), Some("1h"), None, T0).unwrap();
        store.config.write().moderation.enable_moderation = false;

        assert!(!store.is_muted_at(&steve().id, T0 + 1));
        assert_eq!(
            store.mute_at(&Principal::new("Alex"), &moderator(), None, None, T0),
            Err(MuteError::ModerationDisabled)
        );
        assert_eq!(
            store.unmute_at(&steve().id, &moderator(), T0),
            Err(MuteError::ModerationDisabled)
        );
        // the record survives for when moderation is switched back on
        assert!(store.get(&steve().id).is_some());
    }

    #[test]
    fn load_drops_expired_records() {
        let repo = Arc::new(RecordingRepository {
            initial: vec![
                MuteRecord::new(&Principal::new("Old"), &moderator(), T0 - 2 * HOUR, HOUR, "x".into()),
                MuteRecord::new(&steve(), &moderator(), T0 - 10, HOUR, "y".into()),
            ],
            ..Default::default()
        });
        let store = MuteStore::new(Config::default().into_shared(), repo.clone());
        assert_eq!(store.load_at(T0).unwrap(), 1);
        assert!(store.is_muted_at(&steve().id, T0));
        assert_eq!(repo.saves.lock().len(), 1);
    }

    #[test]
    fn active_is_sorted_and_find_by_name_ignores_case() {
        let (store, _) = store();
        store.mute_at(&Principal::new("zed"), &moderator(), Some("1h"), None, T0).unwrap();
        store.mute_at(&Principal::new("Alex"), &moderator(), Some("1m"), None, T0).unwrap();
        store.mute_at(&Principal::new("bob"), &moderator(), Some("1h"), None, T0).unwrap();

        let names: Vec<_> = store
            .active_at(T0 + 120_000)
            .into_iter()
            .map(|r| r.principal_name)
            .collect();
        assert_eq!(names, vec!["bob".to_string(), "zed".to_string()]);

        assert_eq!(store.find_by_name("ZED").unwrap().principal_name, "zed");
        assert!(store.find_by_name("nobody").is_none());
    }

    #[test]
    fn save_to_writes_snapshot_to_other_repository() {
        let (store, repo) = store();
        store.mute_at(&steve(), &moderator(), Some("1h"), None, T0).unwrap();
        let saves_before = repo.saves.lock().len();

        let target = RecordingRepository::default();
        assert_eq!(store.save_to(&target).unwrap(), 1);
        assert_eq!(target.saves.lock()[0][0].principal_name, "Steve");
        assert_eq!(repo.saves.lock().len(), saves_before);
    }
}
