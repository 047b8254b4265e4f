//! Agent state snapshots and where they are kept

use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use navis_core_types::InteractionHistory;

use crate::errors::Result;
use crate::experience::Experience;
use crate::signature::ActionSignature;
use crate::value_table::ValueTable;
use crate::weights::FeatureWeights;

/// Everything needed to resume learning in a new process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub value_table: ValueTable,
    pub success_history: BTreeMap<ActionSignature, VecDeque<bool>>,
    pub feature_weights: FeatureWeights,
    pub exploration_rate: f64,
    /// Buffered experiences, oldest first, so batch updates span restarts
    #[serde(default)]
    pub experiences: Vec<Experience>,
    #[serde(default)]
    pub total_recorded: u64,
    #[serde(default)]
    pub batch_updates: u64,
    /// Kept for the owning session; the agent never reads it
    #[serde(default)]
    pub interaction_history: InteractionHistory,
    #[serde(default = "Utc::now")]
    pub saved_at: DateTime<Utc>,
}

/// Durable storage for agent snapshots.
pub trait SnapshotStore: Send + Sync {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<AgentSnapshot>>;

    fn save(&self, snapshot: &AgentSnapshot) -> Result<()>;
}

/// Pretty-printed JSON file, replaced atomically on save.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshotStore {
    path: PathBuf,
}

impl JsonFileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonFileSnapshotStore {
    fn load(&self) -> Result<Option<AgentSnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read(&self.path)?;
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    fn save(&self, snapshot: &AgentSnapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let temp = self.path.with_extension("tmp");
        let data = serde_json::to_vec_pretty(snapshot)?;
        let mut file = fs::File::create(&temp)?;
        file.write_all(&data)?;
        file.sync_all()?;
        fs::rename(&temp, &self.path)?;
        Ok(())
    }
}

/// In-process store, mainly for sessions that never touch disk.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    slot: Mutex<Option<AgentSnapshot>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Result<Option<AgentSnapshot>> {
        Ok(self.slot.lock().clone())
    }

    fn save(&self, snapshot: &AgentSnapshot) -> Result<()> {
        *self.slot.lock() = Some(snapshot.clone());
        Ok(())
    }
}
