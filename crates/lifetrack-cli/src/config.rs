//! CLI configuration: where the data file lives and which identity
//! owns the collections.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct AppConfig {
    pub data: DataSection,
    pub user: UserSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DataSection {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserSection {
    pub id: String,
}

impl AppConfig {
    pub fn new(data_path: &Path, user_id: String) -> Self {
        Self {
            data: DataSection {
                path: data_path.to_string_lossy().to_string(),
            },
            user: UserSection { id: user_id },
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Cannot read config at {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("Invalid config at {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Cannot create {}", parent.display()))?;
        }
        let raw = toml::to_string_pretty(self).context("Cannot serialize config")?;
        fs::write(path, raw).with_context(|| format!("Cannot write config at {}", path.display()))
    }
}

/// `$XDG_CONFIG_HOME/lifetrack/config.toml`, falling back to
/// `~/.config/lifetrack/config.toml`.
pub fn default_config_path() -> PathBuf {
    base_dir("XDG_CONFIG_HOME", ".config").join("lifetrack/config.toml")
}

/// `$XDG_DATA_HOME/lifetrack/lifetrack.json`, falling back to
/// `~/.local/share/lifetrack/lifetrack.json`.
pub fn default_data_path() -> PathBuf {
    base_dir("XDG_DATA_HOME", ".local/share").join("lifetrack/lifetrack.json")
}

fn base_dir(env_var: &str, home_suffix: &str) -> PathBuf {
    if let Some(dir) = std::env::var_os(env_var).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    let home = std::env::var_os("HOME").unwrap_or_default();
    PathBuf::from(home).join(home_suffix)
}
