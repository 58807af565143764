//! Application context for CLI command execution.
//!
//! [`App`] locates the workspace, loads its configuration, opens the storage
//! backend and wires up a [`DependencyService`].
//!
//! # Example
//!
//! ```no_run
//! use ticketgraph::app::App;
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let app = App::from_directory(Path::new(".")).await?;
//!     let blocked = app
//!         .service()
//!         .blocked_tickets(app.actor(), app.project())
//!         .await?;
//!     println!("{} blocked tickets", blocked.len());
//!     Ok(())
//! }
//! ```

use crate::config::{CONFIG_DIR_NAME, CONFIG_FILE_NAME, Config, find_root};
use crate::domain::{ActorId, ProjectId};
use crate::error::{Error, Result};
use crate::service::DependencyService;
use crate::storage::{Backend, StorageBackend, open_backend};
use crate::tickets::{AllowAll, TicketRegistry};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Actor recorded on edges created without an explicit `--actor`.
pub const DEFAULT_ACTOR: &str = "local";

/// Application context for CLI operations.
pub struct App {
    backend: Backend,
    service: DependencyService,
    config_dir: PathBuf,
    storage: StorageBackend,
    project: ProjectId,
    actor: ActorId,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("config_dir", &self.config_dir)
            .field("storage", &self.storage)
            .field("project", &self.project)
            .field("actor", &self.actor)
            .finish_non_exhaustive()
    }
}

impl App {
    /// Create an App instance from the given working directory.
    ///
    /// Searches up the directory tree for `.ticketgraph/`, loads the
    /// configuration and opens the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No `.ticketgraph/` directory is found in the directory tree
    /// - Configuration cannot be loaded
    /// - Storage cannot be opened
    pub async fn from_directory(working_dir: &Path) -> Result<Self> {
        let root_dir = find_root(working_dir).ok_or_else(|| {
            Error::Config(format!(
                "Not a ticketgraph workspace (or any parent up to the root). Run 'ticketgraph init' to create '{CONFIG_DIR_NAME}'"
            ))
        })?;

        let config_dir = root_dir.join(CONFIG_DIR_NAME);
        let config = Config::load(&config_dir.join(CONFIG_FILE_NAME)).await?;
        let storage = config.to_backend(&root_dir)?;
        let backend = open_backend(&storage)?;

        tracing::debug!(
            root = %root_dir.display(),
            project = %config.project,
            ?storage,
            "Loaded workspace"
        );

        let service = DependencyService::new(
            backend.store.clone(),
            backend.tickets.clone(),
            Arc::new(AllowAll),
        );

        Ok(Self {
            backend,
            service,
            config_dir,
            storage,
            project: ProjectId::new(config.project),
            actor: ActorId::new(DEFAULT_ACTOR),
        })
    }

    /// Override the configured project.
    #[must_use]
    pub fn with_project(mut self, project: Option<&str>) -> Self {
        if let Some(project) = project.map(str::trim).filter(|p| !p.is_empty()) {
            self.project = ProjectId::new(project);
        }
        self
    }

    /// Override the acting identity.
    #[must_use]
    pub fn with_actor(mut self, actor: Option<&str>) -> Self {
        if let Some(actor) = actor.map(str::trim).filter(|a| !a.is_empty()) {
            self.actor = ActorId::new(actor);
        }
        self
    }

    /// Dependency operations.
    #[must_use]
    pub fn service(&self) -> &DependencyService {
        &self.service
    }

    /// Ticket registry sharing storage with the dependency store.
    #[must_use]
    pub fn tickets(&self) -> &dyn TicketRegistry {
        self.backend.registry.as_ref()
    }

    /// Project commands operate on.
    #[must_use]
    pub fn project(&self) -> &ProjectId {
        &self.project
    }

    /// Identity recorded on created edges.
    #[must_use]
    pub fn actor(&self) -> &ActorId {
        &self.actor
    }

    /// Path to the `.ticketgraph` directory.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Resolved storage backend.
    #[must_use]
    pub fn storage(&self) -> &StorageBackend {
        &self.storage
    }
}
