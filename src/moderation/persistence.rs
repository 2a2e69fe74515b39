//! Durable storage for mute records.
//!
//! The store hands complete snapshots to a [`MuteRepository`]
//! (replace-all semantics). [`BackgroundWriter`] moves the actual disk
//! write off the chat path: snapshots are published on a `watch` channel
//! and a writer task persists whatever is newest, so bursts coalesce.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use super::MuteRecord;
use crate::error::PersistenceError;

/// Load-all / replace-all persistence for mute records.
pub trait MuteRepository: Send + Sync {
    fn load_all(&self) -> Result<Vec<MuteRecord>, PersistenceError>;

    fn save_all(&self, records: &[MuteRecord]) -> Result<(), PersistenceError>;
}

/// Repository that persists nothing (`save_mute_data = false`).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpRepository;

impl MuteRepository for NoOpRepository {
    fn load_all(&self) -> Result<Vec<MuteRecord>, PersistenceError> {
        Ok(Vec::new())
    }

    fn save_all(&self, _records: &[MuteRecord]) -> Result<(), PersistenceError> {
        Ok(())
    }
}

/// Suffix source for temp files, so overlapping saves never share one.
static TEMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Plain JSON array on disk, written through a temp file and rename.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    path: PathBuf,
}

impl JsonFileRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MuteRepository for JsonFileRepository {
    fn load_all(&self) -> Result<Vec<MuteRecord>, PersistenceError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save_all(&self, records: &[MuteRecord]) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(records)?;
        let seq = TEMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .path
            .with_extension(format!("json.{}.{seq}.tmp", std::process::id()));
        if let Err(e) = std::fs::write(&tmp, json).and_then(|()| std::fs::rename(&tmp, &self.path)) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        debug!(path = %self.path.display(), count = records.len(), "Mute data saved");
        Ok(())
    }
}

/// Asynchronous front for another repository.
///
/// `save_all` only publishes the snapshot; the spawned task performs the
/// write on the blocking pool. [`BackgroundWriter::close`] (or dropping the
/// writer) lets the task flush the last published snapshot and exit; await
/// the returned handle before touching the file directly.
pub struct BackgroundWriter {
    inner: Arc<dyn MuteRepository>,
    tx: Mutex<Option<watch::Sender<Option<Arc<Vec<MuteRecord>>>>>>,
}

impl BackgroundWriter {
    /// Spawn the writer task. Must be called inside a tokio runtime.
    pub fn spawn(inner: Arc<dyn MuteRepository>) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = watch::channel::<Option<Arc<Vec<MuteRecord>>>>(None);
        let repo = Arc::clone(&inner);
        let handle = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let Some(snapshot) = rx.borrow_and_update().clone() else {
                    continue;
                };
                let repo = Arc::clone(&repo);
                let result = tokio::task::spawn_blocking(move || repo.save_all(&snapshot)).await;
                match result {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => error!(error = %e, "Failed to persist mute data"),
                    Err(e) => error!(error = %e, "Mute data writer panicked"),
                }
            }
            debug!("Mute data writer stopped");
        });
        (
            Self {
                inner,
                tx: Mutex::new(Some(tx)),
            },
            handle,
        )
    }

    /// Stop accepting snapshots. The task finishes the write in progress,
    /// persists anything still pending, then exits.
    pub fn close(&self) {
        self.tx.lock().take();
    }
}

impl MuteRepository for BackgroundWriter {
    fn load_all(&self) -> Result<Vec<MuteRecord>, PersistenceError> {
        self.inner.load_all()
    }

    fn save_all(&self, records: &[MuteRecord]) -> Result<(), PersistenceError> {
        let sent = self
            .tx
            .lock()
            .as_ref()
            .is_some_and(|tx| tx.send(Some(Arc::new(records.to_vec()))).is_ok());
        if !sent {
            error!("Mute data writer is not running, snapshot dropped");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Principal;

    fn record(name: &str, start: i64) -> MuteRecord {
        MuteRecord::new(
            &Principal::new(name),
            &Principal::new("Mod"),
            start,
            60_000,
            "spam".to_string(),
        )
    }

    #[test]
    fn json_file_round_trips_and_uses_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::new(dir.path().join("mutes.json"));
        assert!(repo.load_all().unwrap().is_empty());

        repo.save_all(&[record("Steve", 1_000)]).unwrap();
        let raw = std::fs::read_to_string(repo.path()).unwrap();
        assert!(raw.trim_start().starts_with('['));
        assert!(raw.contains("\"principalName\": \"Steve\""));
        assert!(raw.contains("\"startEpochMillis\": 1000"));

        let loaded = repo.load_all().unwrap();
        assert_eq!(loaded, vec![record("Steve", 1_000)]);
    }

    #[test]
    fn json_file_reports_corrupt_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mutes.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonFileRepository::new(&path).load_all().unwrap_err();
        assert!(matches!(err, PersistenceError::Serialization(_)));
    }

    #[tokio::test]
    async fn background_writer_flushes_latest_snapshot_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let file = Arc::new(JsonFileRepository::new(dir.path().join("mutes.json")));
        let (writer, handle) = BackgroundWriter::spawn(file.clone());

        writer.save_all(&[record("A", 1)]).unwrap();
        writer.save_all(&[record("A", 1), record("B", 2)]).unwrap();
        drop(writer);
        handle.await.unwrap();

        let names: Vec<String> = file
            .load_all()
            .unwrap()
            .into_iter()
            .map(|r| r.principal_name)
            .collect();
        assert_eq!(names, vec!["A".to_string(), "B".to_string()]);
    }

    #[tokio::test]
    async fn closed_writer_is_drained_before_direct_save() {
        let dir = tempfile::tempdir().unwrap();
        let file = Arc::new(JsonFileRepository::new(dir.path().join("mutes.json")));
        let (writer, handle) = BackgroundWriter::spawn(file.clone());
        let writer = Arc::new(writer);
        let shared: Arc<dyn MuteRepository> = writer.clone();

        shared.save_all(&[record("Stale", 1)]).unwrap();
        // A clone is still alive, so dropping ours would not stop the task.
        writer.close();
        handle.await.unwrap();

        // Late snapshots are refused rather than racing the final write.
        shared.save_all(&[record("Late", 2)]).unwrap();
        file.save_all(&[record("Final", 3)]).unwrap();

        let names: Vec<String> = file
            .load_all()
            .unwrap()
            .into_iter()
            .map(|r| r.principal_name)
            .collect();
        assert_eq!(names, vec!["Final".to_string()]);
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn overlapping_saves_use_distinct_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(JsonFileRepository::new(dir.path().join("mutes.json")));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let repo = repo.clone();
                std::thread::spawn(move || repo.save_all(&[record(&format!("P{i}"), i)]))
            })
            .collect();
        for h in handles {
            h.join().unwrap().unwrap();
        }
        assert_eq!(repo.load_all().unwrap().len(), 1);
    }
}
