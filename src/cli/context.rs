use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use learning_agent::JsonFileSnapshotStore;
use once_cell::sync::OnceCell;
use tracing::info;

use crate::cli::output::OutputFormat;
use crate::config::NavisConfig;
use crate::session::{SessionRegistry, SharedSession};

pub struct CliContext {
    config: Arc<NavisConfig>,
    config_path: PathBuf,
    output: OutputFormat,
    registry: OnceCell<SessionRegistry>,
}

impl CliContext {
    pub fn new(config: NavisConfig, config_path: PathBuf, output: OutputFormat) -> Self {
        Self {
            config: Arc::new(config),
            config_path,
            output,
            registry: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &NavisConfig {
        self.config.as_ref()
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn output(&self) -> OutputFormat {
        self.output
    }

    pub fn snapshot_store(&self) -> JsonFileSnapshotStore {
        JsonFileSnapshotStore::new(self.config.snapshot_path())
    }

    /// Validates the configuration the first time it is needed.
    pub fn registry(&self) -> Result<&SessionRegistry> {
        self.registry
            .get_or_try_init(|| SessionRegistry::new(self.config.as_ref().clone()))
            .context("Invalid configuration")
    }

    /// A fresh session whose agent resumes from the persisted snapshot, if any.
    pub fn open_session(&self) -> Result<(SharedSession, bool)> {
        let (id, session) = self.registry()?.create()?;
        let store = self.snapshot_store();
        let restored = session.lock().restore(&store);
        info!(
            session = %id,
            restored,
            "Session opened with snapshot {}",
            store.path().display()
        );
        Ok((session, restored))
    }
}
