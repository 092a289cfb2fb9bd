//! Application context: config resolution, data-file persistence, and
//! the sync engine wired to the in-memory store.
//!
//! The store contents are loaded from a JSON data file at startup and
//! written back atomically after a mutation, so the in-memory backend
//! behaves like a durable local document store between invocations.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;

use lifetrack_core::{MemoryStore, Session, StoreSnapshot, SyncEngine, UserId};

use crate::cli::Cli;
use crate::config::{default_config_path, AppConfig};
use crate::helpers::write_atomic;

pub struct App {
    pub engine: SyncEngine,
    store: Arc<MemoryStore>,
    data_path: PathBuf,
}

impl App {
    /// Load config and data, sign in the configured identity, and
    /// start the sync engine.
    pub fn open(cli: &Cli) -> anyhow::Result<Self> {
        let config_path = config_path(cli);
        if !config_path.exists() {
            anyhow::bail!(
                "No config at {}. Run `lifetrack init` first.",
                config_path.display()
            );
        }
        let config = AppConfig::load(&config_path)?;
        let data_path = match &cli.data {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(&config.data.path),
        };

        let store = Arc::new(load_store(&data_path)?);
        log::debug!("loaded data from {}", data_path.display());
        let session = Session::authenticated(UserId::new(config.user.id));
        let engine =
            SyncEngine::start(store.clone(), &session).context("Cannot start sync engine")?;

        Ok(Self {
            engine,
            store,
            data_path,
        })
    }

    /// Write the store contents back to the data file.
    pub fn persist(&self) -> anyhow::Result<()> {
        let snapshot = self.store.snapshot().context("Cannot export store")?;
        let json = serde_json::to_string_pretty(&snapshot).context("Cannot serialize data")?;
        write_atomic(&self.data_path, json.as_bytes())
            .with_context(|| format!("Cannot write data at {}", self.data_path.display()))
    }
}

pub fn config_path(cli: &Cli) -> PathBuf {
    match &cli.config {
        Some(path) => PathBuf::from(path),
        None => default_config_path(),
    }
}

fn load_store(path: &Path) -> anyhow::Result<MemoryStore> {
    if !path.exists() {
        return Ok(MemoryStore::new());
    }
    let raw =
        fs::read_to_string(path).with_context(|| format!("Cannot read data at {}", path.display()))?;
    let snapshot: StoreSnapshot =
        serde_json::from_str(&raw).with_context(|| format!("Invalid data at {}", path.display()))?;
    MemoryStore::from_snapshot(snapshot)
        .with_context(|| format!("Cannot load data at {}", path.display()))
}
