//! Implementation of the `init` command.
//!
//! Creates the `.ticketgraph/` directory with a configuration file and a
//! `.gitignore` that keeps the database out of version control.

use crate::config::{BackendKind, CONFIG_DIR_NAME, CONFIG_FILE_NAME, Config, DEFAULT_PROJECT};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Name of the gitignore file within .ticketgraph
pub const GITIGNORE_FILE_NAME: &str = ".gitignore";

/// Maximum project name length
pub const MAX_PROJECT_LENGTH: usize = 64;

/// Result of the init command
#[derive(Debug)]
pub struct InitResult {
    /// Path to the created .ticketgraph directory
    pub config_dir: PathBuf,
    /// Path to the created config file
    pub config_file: PathBuf,
    /// Path to the created gitignore file
    pub gitignore_file: PathBuf,
    /// Project written to the configuration
    pub project: String,
    /// Configured storage backend
    pub backend: BackendKind,
}

/// Validate a project name.
///
/// Requirements:
/// - 1-64 characters
/// - ASCII letters, digits, `-` and `_` only
///
/// Expects pre-trimmed input.
///
/// # Errors
///
/// Returns `Error::Config` describing the first rule the name breaks.
pub fn validate_project(project: &str) -> Result<()> {
    if project.is_empty() {
        return Err(Error::Config("Project name must not be empty".to_string()));
    }

    if project.len() > MAX_PROJECT_LENGTH {
        return Err(Error::Config(format!(
            "Project name cannot exceed {MAX_PROJECT_LENGTH} characters"
        )));
    }

    if !project
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::Config(
            "Project name may only contain letters, digits, '-' and '_'".to_string(),
        ));
    }

    Ok(())
}

/// Initialize ticketgraph in the given directory.
///
/// # Errors
///
/// Returns an error if:
/// - The `.ticketgraph/` directory already exists
/// - The project name is invalid
/// - File system operations fail
pub async fn init(base_dir: &Path, project: Option<&str>) -> Result<InitResult> {
    let project = project.unwrap_or(DEFAULT_PROJECT).trim();
    validate_project(project)?;

    let config_dir = base_dir.join(CONFIG_DIR_NAME);
    if config_dir.exists() {
        return Err(Error::Config(format!(
            "ticketgraph is already initialized in this directory. Found existing '{CONFIG_DIR_NAME}'"
        )));
    }

    fs::create_dir_all(&config_dir).await?;

    let config_file = config_dir.join(CONFIG_FILE_NAME);
    let config = Config::new(project);
    config.save(&config_file).await?;

    let gitignore_file = config_dir.join(GITIGNORE_FILE_NAME);
    let gitignore_content = "\
# Local dependency database
*.db
*.db-wal
*.db-shm
";
    fs::write(&gitignore_file, gitignore_content).await?;

    tracing::info!(dir = %config_dir.display(), project, "Initialized ticketgraph");

    Ok(InitResult {
        config_dir,
        config_file,
        gitignore_file,
        project: project.to_string(),
        backend: config.storage.backend,
    })
}
