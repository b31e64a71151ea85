//! Per-device record of anonymous confirmations
//!
//! Advisory anti-spam only: a device that confirmed a report anonymously is
//! not offered to confirm it again. Clearing the device state or switching
//! devices defeats it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Namespace key under which confirmed report ids are stored
pub const CONFIRMED_REPORTS_KEY: &str = "confirmed_reports";

/// Error type for guard persistence
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    #[error("Guard storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Guard storage format error: {0}")]
    Format(#[from] serde_json::Error),
}

/// Durable per-device string sets, keyed by namespace
pub trait GuardBackend: Send + Sync + Debug {
    fn load(&self, namespace: &str) -> Result<BTreeSet<String>, GuardError>;
    fn save(&self, namespace: &str, ids: &BTreeSet<String>) -> Result<(), GuardError>;
}

/// Backend that lives only as long as the process
#[derive(Debug, Default)]
pub struct MemoryGuardBackend {
    sets: Mutex<BTreeMap<String, BTreeSet<String>>>,
}

impl GuardBackend for MemoryGuardBackend {
    fn load(&self, namespace: &str) -> Result<BTreeSet<String>, GuardError> {
        let sets = self.sets.lock().unwrap_or_else(|e| e.into_inner());
        Ok(sets.get(namespace).cloned().unwrap_or_default())
    }

    fn save(&self, namespace: &str, ids: &BTreeSet<String>) -> Result<(), GuardError> {
        let mut sets = self.sets.lock().unwrap_or_else(|e| e.into_inner());
        sets.insert(namespace.to_string(), ids.clone());
        Ok(())
    }
}

/// On-disk layout of the device state file
#[derive(Debug, Default, Serialize, Deserialize)]
struct DeviceState {
    #[serde(flatten)]
    sets: BTreeMap<String, BTreeSet<String>>,
}

/// Backend storing every namespace in one JSON document
#[derive(Debug, Clone)]
pub struct FileGuardBackend {
    path: PathBuf,
}

impl FileGuardBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files count as empty state
    fn read_state(&self) -> DeviceState {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return DeviceState::default(),
            Err(e) => {
                tracing::warn!("Failed to read device state {}: {}", self.path.display(), e);
                return DeviceState::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(
                    "Ignoring corrupt device state {}: {}",
                    self.path.display(),
                    e
                );
                DeviceState::default()
            }
        }
    }
}

impl GuardBackend for FileGuardBackend {
    fn load(&self, namespace: &str) -> Result<BTreeSet<String>, GuardError> {
        Ok(self
            .read_state()
            .sets
            .remove(namespace)
            .unwrap_or_default())
    }

    fn save(&self, namespace: &str, ids: &BTreeSet<String>) -> Result<(), GuardError> {
        let mut state = self.read_state();
        state.sets.insert(namespace.to_string(), ids.clone());

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        // Write beside the target and rename so readers never see a partial file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(&state)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// Remembers which reports this device confirmed anonymously
#[derive(Debug)]
pub struct AnonymousGuard {
    backend: Box<dyn GuardBackend>,
    confirmed: Mutex<Option<BTreeSet<String>>>,
}

impl AnonymousGuard {
    pub fn new(backend: impl GuardBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            confirmed: Mutex::new(None),
        }
    }

    /// Guard without persistence
    pub fn in_memory() -> Self {
        Self::new(MemoryGuardBackend::default())
    }

    /// Guard persisted to a JSON file
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(FileGuardBackend::new(path))
    }

    fn with_set<R>(&self, f: impl FnOnce(&mut BTreeSet<String>) -> R) -> R {
        let mut cached = self.confirmed.lock().unwrap_or_else(|e| e.into_inner());
        let set = cached.get_or_insert_with(|| {
            self.backend
                .load(CONFIRMED_REPORTS_KEY)
                .unwrap_or_else(|e| {
                    tracing::warn!("Failed to load anonymous confirmations: {}", e);
                    BTreeSet::new()
                })
        });
        f(set)
    }

    pub fn has_confirmed(&self, report_id: &str) -> bool {
        self.with_set(|set| set.contains(report_id))
    }

    /// Remember an anonymous confirmation. Persistence failures are logged only.
    pub fn record_confirmed(&self, report_id: &str) {
        self.with_set(|set| {
            if set.insert(report_id.to_string())
                && let Err(e) = self.backend.save(CONFIRMED_REPORTS_KEY, set)
            {
                tracing::warn!(report_id, "Failed to persist anonymous confirmation: {}", e);
            }
        });
    }

    /// Number of reports confirmed from this device
    pub fn len(&self) -> usize {
        self.with_set(|set| set.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
