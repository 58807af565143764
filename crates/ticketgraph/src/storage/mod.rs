//! Storage abstraction for dependency edges.
//!
//! This module provides the core storage trait and a factory for the
//! supported backends:
//!
//! - **`SQLite`**: Persistent storage; the cycle check and insert share one
//!   `IMMEDIATE` transaction so concurrent writers (threads, processes, or
//!   service instances sharing the file) serialize on the database write lock
//! - **In-memory**: Ephemeral storage backed by petgraph, guarded by an async
//!   mutex; suitable for tests and embedding
//!
//! # Architecture
//!
//! The trait is async and object-safe so callers hold an
//! `Arc<dyn DependencyStore>` regardless of backend. All methods take `&self`;
//! backends synchronize internally. Neither backend caches graph state outside
//! of its own storage: every call reads the current edge set.
//!
//! # Example
//!
//! ```no_run
//! use ticketgraph::domain::{ProjectId, RequestedRelation, TicketId};
//! use ticketgraph::normalize::normalize;
//! use ticketgraph::storage::{StorageBackend, open_backend};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = open_backend(&StorageBackend::InMemory)?;
//!     let project = ProjectId::new("demo");
//!
//!     let edge = normalize(
//!         &TicketId::new("demo-1"),
//!         &TicketId::new("demo-2"),
//!         RequestedRelation::Blocks,
//!     )?;
//!     let stored = backend.store.create_edge(&project, edge, None).await?;
//!     println!("Created dependency {}", stored.id);
//!
//!     Ok(())
//! }
//! ```

pub mod in_memory;
pub mod sqlite;

use crate::domain::{ActorId, CanonicalEdge, Edge, EdgeId, ProjectId, TicketId};
use crate::error::{Error, Result};
use crate::graph::DependencyGraph;
use crate::tickets::{InMemoryTickets, TicketDirectory, TicketRegistry};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Core storage trait for dependency edges.
///
/// # Method Categories
///
/// - **Mutations**: `create_edge`, `delete_edge`, `delete_edges_for_ticket`
/// - **Queries**: `list_edges_for_ticket`, `project_edges`, `neighborhood`
///
/// # Error Handling
///
/// - `AlreadyExists`: the canonical edge is already stored
/// - `DependencyCycle`: a blocking edge would close a cycle
/// - `NotFound`: the edge does not match the given scope
/// - `InvalidInput`: a self-loop reached the store
/// - `Database` / `Internal`: backend failures
#[async_trait]
pub trait DependencyStore: Send + Sync {
    // ========== Mutations ==========

    /// Store a canonical edge.
    ///
    /// Runs the duplicate check and, for blocking edges, the cycle guard in
    /// the same atomic unit as the insert.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidInput` if `edge.from == edge.to`
    /// - `Error::AlreadyExists` if the canonical edge exists
    /// - `Error::DependencyCycle` if a reverse blocking path exists
    async fn create_edge(
        &self,
        project: &ProjectId,
        edge: CanonicalEdge,
        creator: Option<ActorId>,
    ) -> Result<Edge>;

    /// Delete an edge, scoped to its project and one of its endpoints.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` unless an edge with `edge_id` exists in
    /// `project` and touches `ticket`.
    async fn delete_edge(
        &self,
        edge_id: EdgeId,
        project: &ProjectId,
        ticket: &TicketId,
    ) -> Result<()>;

    /// Delete every edge touching `ticket`, returning how many were removed.
    ///
    /// Used when the ticket itself is deleted.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    async fn delete_edges_for_ticket(
        &self,
        project: &ProjectId,
        ticket: &TicketId,
    ) -> Result<usize>;

    // ========== Queries ==========

    /// All edges touching `ticket` in either direction, in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    async fn list_edges_for_ticket(
        &self,
        project: &ProjectId,
        ticket: &TicketId,
    ) -> Result<Vec<Edge>>;

    /// All edges of the project, in creation order.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    async fn project_edges(&self, project: &ProjectId) -> Result<Vec<Edge>>;

    /// Bounded neighborhood around `root`, read from one consistent snapshot.
    ///
    /// `depth` is clamped by the graph engine; see [`crate::graph`].
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    async fn neighborhood(
        &self,
        project: &ProjectId,
        root: &TicketId,
        depth: u32,
    ) -> Result<DependencyGraph>;
}

/// Default time a `SQLite` writer waits for the write lock.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-memory storage (ephemeral)
    InMemory,

    /// `SQLite` database file (persistent)
    Sqlite {
        /// Path to the database file
        path: PathBuf,
        /// How long a writer waits for the database lock
        busy_timeout: Duration,
    },
}

impl StorageBackend {
    /// Returns the database path for file-based backends.
    #[must_use]
    pub fn data_path(&self) -> Option<&Path> {
        match self {
            StorageBackend::Sqlite { path, .. } => Some(path),
            StorageBackend::InMemory => None,
        }
    }
}

/// Handles to an opened backend.
///
/// The edge store and the ticket registry share the same underlying storage.
#[derive(Clone)]
pub struct Backend {
    /// Edge storage
    pub store: Arc<dyn DependencyStore>,

    /// Ticket lookups for the service layer
    pub tickets: Arc<dyn TicketDirectory>,

    /// Ticket registration for local tooling
    pub registry: Arc<dyn TicketRegistry>,
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("store", &"<dyn DependencyStore>")
            .field("tickets", &"<dyn TicketDirectory>")
            .finish_non_exhaustive()
    }
}

/// Open the storage for the given backend.
///
/// # Errors
///
/// - `Error::Io` if the database directory cannot be created
/// - `Error::Database` if the database cannot be opened or migrated
pub fn open_backend(backend: &StorageBackend) -> Result<Backend> {
    match backend {
        StorageBackend::InMemory => {
            tracing::debug!("Opening in-memory storage");
            let tickets = Arc::new(InMemoryTickets::new());
            Ok(Backend {
                store: in_memory::new_in_memory_store(),
                tickets: tickets.clone(),
                registry: tickets,
            })
        }
        StorageBackend::Sqlite { path, busy_timeout } => {
            tracing::debug!(path = %path.display(), "Opening SQLite storage");
            let store = Arc::new(sqlite::SqliteStore::open(path, *busy_timeout)?);
            Ok(Backend {
                store: store.clone(),
                tickets: store.clone(),
                registry: store,
            })
        }
    }
}

/// Reject self-loops that bypassed the normalizer.
pub(crate) fn reject_self_loop(edge: &CanonicalEdge) -> Result<()> {
    if edge.from == edge.to {
        return Err(Error::InvalidInput(format!(
            "ticket {} cannot depend on itself",
            edge.from
        )));
    }
    Ok(())
}
