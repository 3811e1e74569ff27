//! Durable storage of the lift record.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use serde::{Deserialize, Serialize};

use crate::dataset::Dataset;
use crate::error::{BridgeLiftError, BridgeLiftResult};
use crate::event::LiftEvent;

const FORMAT_VERSION: u32 = 1;

/// Loads and persists the whole record.
pub trait LiftStore {
    /// Returns an empty dataset if nothing has been saved yet.
    fn load(&self) -> BridgeLiftResult<Dataset>;

    /// Replaces the stored record. Must be atomic.
    fn save(&self, dataset: &Dataset) -> BridgeLiftResult<()>;
}

#[derive(Serialize)]
struct StoredLiftsRef<'a> {
    version: u32,
    lifts: &'a [LiftEvent],
}

#[derive(Deserialize)]
struct StoredLifts {
    version: u32,
    lifts: Vec<LiftEvent>,
}

/// A JSON file holding `{ "version": 1, "lifts": [...] }`.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl LiftStore for JsonStore {
    fn load(&self) -> BridgeLiftResult<Dataset> {
        if !self.path.exists() {
            tracing::info!(path = %self.path.display(), "No lift data yet, starting empty");
            return Ok(Dataset::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| BridgeLiftError::store_load(&self.path, e))?;

        let stored: StoredLifts = serde_json::from_str(&content)
            .map_err(|e| BridgeLiftError::store_load(&self.path, e))?;

        if stored.version != FORMAT_VERSION {
            return Err(BridgeLiftError::store_load(
                &self.path,
                format!("unsupported format version {}", stored.version),
            ));
        }

        if !Dataset::is_normalized(&stored.lifts) {
            tracing::warn!(
                path = %self.path.display(),
                "Stored lifts were out of order or duplicated, normalizing"
            );
        }

        Ok(Dataset::from_events(stored.lifts))
    }

    fn save(&self, dataset: &Dataset) -> BridgeLiftResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| BridgeLiftError::store_save(&self.path, e))?;
        }

        let stored = StoredLiftsRef {
            version: FORMAT_VERSION,
            lifts: dataset.as_slice(),
        };
        let content = serde_json::to_string_pretty(&stored)
            .map_err(|e| BridgeLiftError::Serialization(e.to_string()))?;

        let temp = self.temp_path();
        write_synced(&temp, content.as_bytes())
            .map_err(|e| BridgeLiftError::store_save(&self.path, e))?;
        fs::rename(&temp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&temp);
            BridgeLiftError::store_save(&self.path, e)
        })?;

        tracing::debug!(path = %self.path.display(), lifts = dataset.len(), "Saved lift data");
        Ok(())
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Exclusive lock held for the duration of one update cycle.
///
/// Released when dropped.
pub struct RunLock {
    _file: File,
    path: PathBuf,
}

impl RunLock {
    /// Lock file path for a given data file (`lifts.json` -> `lifts.json.lock`).
    pub fn path_for(data_path: &Path) -> PathBuf {
        let mut name = data_path.file_name().unwrap_or_default().to_os_string();
        name.push(".lock");
        data_path.with_file_name(name)
    }

    /// Acquire the lock for `data_path`, failing if another cycle holds it.
    pub fn acquire(data_path: &Path) -> BridgeLiftResult<Self> {
        let path = Self::path_for(data_path);

        let file = open_lock_file(&path).map_err(|e| BridgeLiftError::LockFile {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        file.try_lock_exclusive()
            .map_err(|_| BridgeLiftError::Locked(path.display().to_string()))?;

        tracing::debug!(path = %path.display(), "Acquired run lock");
        Ok(RunLock { _file: file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn open_lock_file(path: &Path) -> std::io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    File::create(path)
}
