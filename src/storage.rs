#[cfg(test)]
use std::cell::RefCell;
use std::path::PathBuf;
#[cfg(test)]
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use timer_core::LapRecord;

use crate::error::{Error, Result};

/// Serialized lap entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedLap {
    pub number: u32,
    pub split: f64,
    pub total: f64,
}

impl From<&LapRecord> for SavedLap {
    fn from(lap: &LapRecord) -> Self {
        Self {
            number: lap.number,
            split: lap.split_ms,
            total: lap.total_ms,
        }
    }
}

impl From<SavedLap> for LapRecord {
    fn from(lap: SavedLap) -> Self {
        Self {
            number: lap.number,
            split_ms: lap.split,
            total_ms: lap.total,
        }
    }
}

/// Rounding slack when checking a stored split against its totals.
const SPLIT_TOLERANCE_MS: f64 = 1e-6;

fn first_lap_number() -> u32 {
    1
}

/// Everything needed to bring a stopwatch back after a restart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSnapshot {
    #[serde(default)]
    pub elapsed_time: f64,
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub start_time_reference: Option<f64>,
    #[serde(default)]
    pub laps: Vec<SavedLap>,
    #[serde(default = "first_lap_number")]
    pub lap_counter: u32,
    /// Wall-clock epoch milliseconds at save time.
    pub saved_at: i64,
}

impl PersistedSnapshot {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses and sanity-checks a stored snapshot.
    pub fn from_json(raw: &str) -> Result<Self> {
        let snapshot: Self = serde_json::from_str(raw)?;
        if !snapshot.elapsed_time.is_finite() || snapshot.elapsed_time < 0.0 {
            return Err(Error::CorruptSnapshot(format!(
                "elapsed time {}",
                snapshot.elapsed_time
            )));
        }
        let mut previous_total = 0.0;
        let mut previous_number = 0;
        for lap in &snapshot.laps {
            let split_matches = lap.split.is_finite()
                && lap.split >= 0.0
                && (lap.split - (lap.total - previous_total)).abs() <= SPLIT_TOLERANCE_MS;
            if lap.number <= previous_number
                || !lap.total.is_finite()
                || lap.total < previous_total
                || !split_matches
            {
                return Err(Error::CorruptSnapshot(format!("lap {}", lap.number)));
            }
            previous_total = lap.total;
            previous_number = lap.number;
        }
        Ok(snapshot)
    }

    /// Milliseconds between save and `wall_now_ms`; negative if the clock went backwards.
    pub fn age_ms(&self, wall_now_ms: i64) -> i64 {
        wall_now_ms.saturating_sub(self.saved_at)
    }
}

/// A single named slot holding the serialized snapshot. Last write wins.
pub trait SnapshotStore {
    fn load(&self) -> Result<Option<String>>;
    fn save(&mut self, data: &str) -> Result<()>;
    fn remove(&mut self) -> Result<()>;
}

/// JSON file on disk, replaced atomically on every save.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Result<Option<String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, data: &str) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, data)?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn remove(&mut self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// Store kept in memory. Clones share the slot; `fail_writes` simulates a
/// full or unavailable store.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MemoryStore {
    slot: Rc<RefCell<Option<String>>>,
    fail_writes: Rc<RefCell<bool>>,
    writes: Rc<RefCell<usize>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(data: &str) -> Self {
        let store = Self::default();
        *store.slot.borrow_mut() = Some(data.to_string());
        store
    }

    pub fn contents(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.borrow_mut() = fail;
    }

    /// Number of successful saves.
    pub fn writes(&self) -> usize {
        *self.writes.borrow()
    }
}

#[cfg(test)]
impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.contents())
    }

    fn save(&mut self, data: &str) -> Result<()> {
        if *self.fail_writes.borrow() {
            return Err(Error::StoreUnavailable);
        }
        *self.slot.borrow_mut() = Some(data.to_string());
        *self.writes.borrow_mut() += 1;
        Ok(())
    }

    fn remove(&mut self) -> Result<()> {
        self.slot.borrow_mut().take();
        Ok(())
    }
}
