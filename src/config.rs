//! Application configuration and on-disk layout. Settings live in a small
//! JSON file next to the database; a missing or unreadable file simply means
//! defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::csv::FILE_COLUMN;
use crate::models::Branding;
use crate::store::DB_FILE_NAME;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".raffle-manager";
const CONFIG_FILE_NAME: &str = "config.json";
const LOG_FILE_NAME: &str = "raffle-manager.log";

/// Animation period of the draw, in milliseconds.
pub const DEFAULT_TICK_MS: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub branding: Branding,
    /// Winners requested per draw when the app starts.
    pub default_winner_count: usize,
    pub tick_interval_ms: u64,
    /// CSV column read by imports (0 for plain files, 1 for spreadsheet
    /// exports).
    pub import_column: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            branding: Branding::default(),
            default_winner_count: 1,
            tick_interval_ms: DEFAULT_TICK_MS,
            import_column: FILE_COLUMN,
        }
    }
}

impl AppConfig {
    /// Read `path`, falling back to defaults if it is missing or malformed.
    pub fn load_from(path: &Path) -> Self {
        let config = match fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|err| {
                warn!("ignoring malformed config {}: {err}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        config.sanitized()
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("failed to create config directory")?;
        }
        let json = serde_json::to_string_pretty(self).context("failed to encode config")?;
        fs::write(path, json).context("failed to write config file")
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    fn sanitized(mut self) -> Self {
        self.default_winner_count = self.default_winner_count.max(1);
        if self.tick_interval_ms == 0 {
            self.tick_interval_ms = DEFAULT_TICK_MS;
        }
        self
    }
}

/// Files kept inside the data directory.
#[derive(Debug, Clone)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    /// Use `override_dir` if given, otherwise `~/.raffle-manager`.
    pub fn resolve(override_dir: Option<PathBuf>) -> Result<Self> {
        let root = match override_dir {
            Some(dir) => dir,
            None => {
                let base_dirs =
                    BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
                base_dirs.home_dir().join(DATA_DIR_NAME)
            }
        };
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn database(&self) -> PathBuf {
        self.root.join(DB_FILE_NAME)
    }

    pub fn config(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }

    pub fn log_file(&self) -> PathBuf {
        self.root.join(LOG_FILE_NAME)
    }
}
