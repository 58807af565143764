//! Configuration management for ticketgraph.
//!
//! Configuration lives in `.ticketgraph/config.yaml` at the workspace root:
//!
//! ```yaml
//! project: default
//! storage:
//!   backend: sqlite
//!   path: .ticketgraph/graph.db
//!   busy-timeout-ms: 5000
//! ```
//!
//! Relative storage paths are resolved against the workspace root (the
//! directory containing `.ticketgraph/`).
//!
//! Every command runs in a fresh process, so a workspace is always backed by
//! a database file. The in-memory store is only available to library users
//! through [`StorageBackend::InMemory`].

use crate::error::{Error, Result};
use crate::storage::{DEFAULT_BUSY_TIMEOUT, StorageBackend};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;

/// Name of the ticketgraph directory
pub const CONFIG_DIR_NAME: &str = ".ticketgraph";

/// Name of the configuration file
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Name of the `SQLite` database file
pub const DATABASE_FILE_NAME: &str = "graph.db";

/// Project used when none is configured
pub const DEFAULT_PROJECT: &str = "default";

/// Maximum directory depth to traverse when searching for the workspace root
pub const MAX_TRAVERSAL_DEPTH: usize = 256;

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Project that commands operate on unless overridden
    pub project: String,

    /// Storage configuration
    pub storage: StorageConfig,
}

/// Storage backend kind
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum BackendKind {
    /// `SQLite` database file
    #[default]
    Sqlite,
}

/// Storage configuration section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct StorageConfig {
    /// Storage backend type
    pub backend: BackendKind,

    /// Path to the database file, relative to the workspace root
    #[serde(default = "default_database_path")]
    pub path: String,

    /// How long a writer waits for the database lock, in milliseconds
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_database_path() -> String {
    format!("{CONFIG_DIR_NAME}/{DATABASE_FILE_NAME}")
}

fn default_busy_timeout_ms() -> u64 {
    u64::try_from(DEFAULT_BUSY_TIMEOUT.as_millis()).unwrap_or(u64::MAX)
}

impl StorageConfig {
    /// Resolve the configured backend against the workspace root.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if the `SQLite` path is empty.
    pub fn to_backend(&self, root: &Path) -> Result<StorageBackend> {
        match self.backend {
            BackendKind::Sqlite => {
                if self.path.trim().is_empty() {
                    return Err(Error::Config("storage.path must not be empty".to_string()));
                }
                let path = Path::new(&self.path);
                let path = if path.is_absolute() {
                    path.to_path_buf()
                } else {
                    root.join(path)
                };
                Ok(StorageBackend::Sqlite {
                    path,
                    busy_timeout: Duration::from_millis(self.busy_timeout_ms),
                })
            }
        }
    }
}

impl Config {
    /// Create a new configuration for `project` with default storage
    #[must_use]
    pub fn new(project: &str) -> Self {
        Self {
            project: project.to_string(),
            storage: StorageConfig {
                backend: BackendKind::default(),
                path: default_database_path(),
                busy_timeout_ms: default_busy_timeout_ms(),
            },
        }
    }

    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be read and `Error::Config` if it
    /// is not valid YAML for this structure.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        serde_yaml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid {}: {e}", path.display())))
    }

    /// Save configuration to a file
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be written.
    pub async fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_yaml::to_string(self).map_err(|e| Error::Config(format!("YAML error: {e}")))?;
        fs::write(path, content).await?;
        Ok(())
    }
}

impl Config {
    /// Resolve the storage section against the workspace root.
    ///
    /// # Errors
    ///
    /// See [`StorageConfig::to_backend`].
    pub fn to_backend(&self, root: &Path) -> Result<StorageBackend> {
        self.storage.to_backend(root)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT)
    }
}

/// Find the workspace root by searching up the directory tree.
///
/// Returns the directory containing `.ticketgraph/`, or `None` if none is
/// found within [`MAX_TRAVERSAL_DEPTH`] levels.
#[must_use]
pub fn find_root(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    let mut depth = 0;

    loop {
        if current.join(CONFIG_DIR_NAME).is_dir() {
            return Some(current);
        }

        depth += 1;
        if depth > MAX_TRAVERSAL_DEPTH || !current.pop() {
            return None;
        }
    }
}
