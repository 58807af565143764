//! `SQLite` storage backend.
//!
//! `SQLite` is the source of truth for every edge; nothing is cached between
//! calls. Blocking `rusqlite` calls run on tokio's blocking pool.
//!
//! ## Write discipline
//!
//! `create_edge` opens an `IMMEDIATE` transaction, which takes the database
//! write lock before the first read. The duplicate check, the cycle guard's
//! recursive path query, and the insert all run under that lock, so two
//! writers racing to insert opposite halves of a cycle are serialized: the
//! second one sees the first one's edge and is rejected. This holds across
//! connections and processes sharing the file, not only within this process.
//!
//! The transaction is owned by the blocking closure. If the awaiting future is
//! dropped, the closure still runs to completion and the transaction either
//! commits whole or rolls back on drop; no half-applied edge is visible.
//!
//! ## Module Structure
//!
//! - `schema` - Database schema (DDL)
//! - `helpers` - Row conversion and parsing utilities

mod helpers;
mod schema;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension, TransactionBehavior, params};

use crate::domain::{
    ActorId, CanonicalEdge, Edge, EdgeId, ProjectId, TicketId, TicketSummary,
};
use crate::error::{Error, Result};
use crate::graph::{self, DependencyGraph};
use crate::guard::{self, ProjectView};
use crate::storage::{DependencyStore, reject_self_loop};
use crate::tickets::{TicketDirectory, TicketRegistry};

use helpers::{EDGE_COLUMNS, TICKET_COLUMNS, format_timestamp, row_to_edge, row_to_ticket};
pub(crate) use schema::SCHEMA;

/// Recursive reachability over a project's blocking edges.
///
/// `UNION` (not `UNION ALL`) discards tickets already reached, so the
/// recursion terminates after at most one step per edge even if the stored
/// graph were corrupted into a cycle.
const BLOCKING_PATH_SQL: &str = "
    WITH RECURSIVE reachable(ticket) AS (
        SELECT ?2
        UNION
        SELECT e.to_ticket
        FROM dependency_edges e
        JOIN reachable r ON e.from_ticket = r.ticket
        WHERE e.project_id = ?1 AND e.kind = 'blocks'
    )
    SELECT EXISTS (SELECT 1 FROM reachable WHERE ticket = ?3)";

/// `SQLite`-backed dependency store.
///
/// The connection is wrapped in `Arc<Mutex<_>>` so it can move into blocking
/// tasks. Separate `SqliteStore` instances over the same file coordinate
/// through `SQLite`'s own locking.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open or create the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the
    /// database cannot be opened or migrated.
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Self::initialize(conn, busy_timeout)
    }

    /// Open a private in-memory database. Intended for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be applied.
    pub fn open_in_memory() -> Result<Self> {
        Self::initialize(Connection::open_in_memory()?, super::DEFAULT_BUSY_TIMEOUT)
    }

    fn initialize(conn: Connection, busy_timeout: Duration) -> Result<Self> {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` with the connection on the blocking thread pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = lock(&conn)?;
            f(&mut guard)
        })
        .await
        .map_err(|e| Error::Internal(format!("database task failed: {e}")))?
    }
}

/// Acquire the connection lock, converting poison errors to our error type.
fn lock(conn: &Mutex<Connection>) -> Result<MutexGuard<'_, Connection>> {
    conn.lock().map_err(|e| {
        Error::Internal(format!(
            "database connection mutex poisoned (a thread panicked while holding the lock): {e}"
        ))
    })
}

/// Map an insert failure, turning the uniqueness constraint into `AlreadyExists`.
fn map_insert_error(err: rusqlite::Error, edge: &CanonicalEdge) -> Error {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            Error::AlreadyExists {
                from: edge.from.clone(),
                to: edge.to.clone(),
                kind: edge.kind,
            }
        }
        _ => Error::Database(err),
    }
}

/// A project-scoped view over a connection or open transaction.
struct SqlProjectView<'a> {
    conn: &'a Connection,
    project: &'a ProjectId,
}

impl SqlProjectView<'_> {
    fn contains(&self, edge: &CanonicalEdge) -> Result<bool> {
        let exists = self.conn.query_row(
            "SELECT EXISTS (
                SELECT 1 FROM dependency_edges
                WHERE project_id = ?1 AND from_ticket = ?2 AND to_ticket = ?3 AND kind = ?4
            )",
            params![
                self.project.as_str(),
                edge.from.as_str(),
                edge.to.as_str(),
                edge.kind.as_str()
            ],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn all_edges(&self) -> Result<Vec<Edge>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {EDGE_COLUMNS} FROM dependency_edges
             WHERE project_id = ?1
             ORDER BY created_at, id"
        ))?;
        let edges = stmt
            .query_map([self.project.as_str()], row_to_edge)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(edges)
    }
}

impl ProjectView for SqlProjectView<'_> {
    fn blocking_path_exists(&self, from: &TicketId, to: &TicketId) -> Result<bool> {
        let exists = self.conn.query_row(
            BLOCKING_PATH_SQL,
            params![self.project.as_str(), from.as_str(), to.as_str()],
            |row| row.get(0),
        )?;
        Ok(exists)
    }

    fn edges_touching(&self, ticket: &TicketId) -> Result<Vec<Edge>> {
        let mut stmt = self.conn.prepare_cached(&format!(
            "SELECT {EDGE_COLUMNS} FROM dependency_edges
             WHERE project_id = ?1 AND (from_ticket = ?2 OR to_ticket = ?2)
             ORDER BY created_at, id"
        ))?;
        let edges = stmt
            .query_map(params![self.project.as_str(), ticket.as_str()], row_to_edge)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(edges)
    }
}

#[async_trait]
impl DependencyStore for SqliteStore {
    async fn create_edge(
        &self,
        project: &ProjectId,
        edge: CanonicalEdge,
        creator: Option<ActorId>,
    ) -> Result<Edge> {
        reject_self_loop(&edge)?;
        let project = project.clone();

        let created = self
            .with_conn(move |conn| {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

                {
                    let view = SqlProjectView {
                        conn: &tx,
                        project: &project,
                    };
                    if view.contains(&edge)? {
                        return Err(Error::AlreadyExists {
                            from: edge.from.clone(),
                            to: edge.to.clone(),
                            kind: edge.kind,
                        });
                    }
                    guard::ensure_acyclic(&view, &edge)?;
                }

                let created_at = helpers::now();
                tx.execute(
                    "INSERT INTO dependency_edges
                        (project_id, from_ticket, to_ticket, kind, created_at, created_by)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    params![
                        project.as_str(),
                        edge.from.as_str(),
                        edge.to.as_str(),
                        edge.kind.as_str(),
                        format_timestamp(&created_at),
                        creator.as_ref().map(ActorId::as_str),
                    ],
                )
                .map_err(|e| map_insert_error(e, &edge))?;
                let id = EdgeId(tx.last_insert_rowid());
                tx.commit()?;

                Ok(Edge {
                    id,
                    project_id: project,
                    from_ticket: edge.from,
                    to_ticket: edge.to,
                    kind: edge.kind,
                    created_at,
                    created_by: creator,
                })
            })
            .await?;

        tracing::debug!(
            edge_id = %created.id,
            project = %created.project_id,
            from = %created.from_ticket,
            to = %created.to_ticket,
            kind = %created.kind,
            "Inserted dependency edge"
        );
        Ok(created)
    }

    async fn delete_edge(
        &self,
        edge_id: EdgeId,
        project: &ProjectId,
        ticket: &TicketId,
    ) -> Result<()> {
        let project = project.clone();
        let ticket = ticket.clone();

        self.with_conn(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM dependency_edges
                 WHERE id = ?1 AND project_id = ?2 AND (from_ticket = ?3 OR to_ticket = ?3)",
                params![edge_id.as_i64(), project.as_str(), ticket.as_str()],
            )?;
            if deleted == 0 {
                return Err(Error::edge_not_found(edge_id, &ticket));
            }
            Ok(())
        })
        .await
    }

    async fn delete_edges_for_ticket(
        &self,
        project: &ProjectId,
        ticket: &TicketId,
    ) -> Result<usize> {
        let project = project.clone();
        let ticket = ticket.clone();

        self.with_conn(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM dependency_edges
                 WHERE project_id = ?1 AND (from_ticket = ?2 OR to_ticket = ?2)",
                params![project.as_str(), ticket.as_str()],
            )?;
            Ok(deleted)
        })
        .await
    }

    async fn list_edges_for_ticket(
        &self,
        project: &ProjectId,
        ticket: &TicketId,
    ) -> Result<Vec<Edge>> {
        let project = project.clone();
        let ticket = ticket.clone();

        self.with_conn(move |conn| {
            SqlProjectView {
                conn,
                project: &project,
            }
            .edges_touching(&ticket)
        })
        .await
    }

    async fn project_edges(&self, project: &ProjectId) -> Result<Vec<Edge>> {
        let project = project.clone();

        self.with_conn(move |conn| {
            SqlProjectView {
                conn,
                project: &project,
            }
            .all_edges()
        })
        .await
    }

    async fn neighborhood(
        &self,
        project: &ProjectId,
        root: &TicketId,
        depth: u32,
    ) -> Result<DependencyGraph> {
        let project = project.clone();
        let root = root.clone();

        self.with_conn(move |conn| {
            // One read transaction so every BFS level sees the same snapshot
            let tx = conn.transaction()?;
            let view = SqlProjectView {
                conn: &tx,
                project: &project,
            };
            graph::expand_neighborhood(&view, &root, depth)
        })
        .await
    }
}

#[async_trait]
impl TicketDirectory for SqliteStore {
    async fn lookup(
        &self,
        project: &ProjectId,
        ticket: &TicketId,
    ) -> Result<Option<TicketSummary>> {
        let project = project.clone();
        let ticket = ticket.clone();

        self.with_conn(move |conn| {
            let summary = conn
                .query_row(
                    &format!(
                        "SELECT {TICKET_COLUMNS} FROM tickets WHERE project_id = ?1 AND id = ?2"
                    ),
                    params![project.as_str(), ticket.as_str()],
                    row_to_ticket,
                )
                .optional()?;
            Ok(summary)
        })
        .await
    }
}

#[async_trait]
impl TicketRegistry for SqliteStore {
    async fn register(&self, project: &ProjectId, ticket: TicketSummary) -> Result<()> {
        let project = project.clone();

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO tickets (project_id, id, title, status) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT (project_id, id) DO UPDATE
                 SET title = excluded.title, status = excluded.status",
                params![
                    project.as_str(),
                    ticket.id.as_str(),
                    ticket.title,
                    ticket.status.as_str()
                ],
            )?;
            Ok(())
        })
        .await
    }

    async fn remove(&self, project: &ProjectId, ticket: &TicketId) -> Result<bool> {
        let project = project.clone();
        let ticket = ticket.clone();

        self.with_conn(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM tickets WHERE project_id = ?1 AND id = ?2",
                params![project.as_str(), ticket.as_str()],
            )?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn list(&self, project: &ProjectId) -> Result<Vec<TicketSummary>> {
        let project = project.clone();

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TICKET_COLUMNS} FROM tickets WHERE project_id = ?1 ORDER BY id"
            ))?;
            let tickets = stmt
                .query_map([project.as_str()], row_to_ticket)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(tickets)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RelationKind;

    fn blocks(from: &str, to: &str) -> CanonicalEdge {
        CanonicalEdge {
            from: TicketId::new(from),
            to: TicketId::new(to),
            kind: RelationKind::Blocks,
        }
    }

    #[tokio::test]
    async fn test_blocking_path_ignores_related_edges() {
        let store = SqliteStore::open_in_memory().unwrap();
        let project = ProjectId::new("p");

        store
            .create_edge(&project, blocks("a", "b"), None)
            .await
            .unwrap();
        store
            .create_edge(
                &project,
                CanonicalEdge {
                    from: TicketId::new("b"),
                    to: TicketId::new("c"),
                    kind: RelationKind::Related,
                },
                None,
            )
            .await
            .unwrap();

        // b related c does not make c reachable from a
        store
            .create_edge(&project, blocks("c", "a"), None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_blocking_path_is_scoped_to_project() {
        let store = SqliteStore::open_in_memory().unwrap();
        let alpha = ProjectId::new("alpha");
        let beta = ProjectId::new("beta");

        store
            .create_edge(&alpha, blocks("a", "b"), None)
            .await
            .unwrap();
        store
            .create_edge(&beta, blocks("b", "a"), None)
            .await
            .unwrap();

        let err = store
            .create_edge(&alpha, blocks("b", "a"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DependencyCycle { .. }));
    }

    #[tokio::test]
    async fn test_created_edge_matches_stored_edge() {
        let store = SqliteStore::open_in_memory().unwrap();
        let project = ProjectId::new("p");

        let created = store
            .create_edge(&project, blocks("a", "b"), Some(ActorId::new("alice")))
            .await
            .unwrap();
        let listed = store
            .list_edges_for_ticket(&project, &TicketId::new("b"))
            .await
            .unwrap();

        assert_eq!(listed, vec![created]);
    }

    #[test]
    fn test_unique_violation_maps_to_already_exists() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        let insert = "INSERT INTO dependency_edges
            (project_id, from_ticket, to_ticket, kind, created_at)
            VALUES ('p', 'a', 'b', 'blocks', '2026-01-01T00:00:00.000000Z')";
        conn.execute(insert, []).unwrap();

        let err = conn.execute(insert, []).unwrap_err();
        let mapped = map_insert_error(err, &blocks("a", "b"));
        assert!(matches!(mapped, Error::AlreadyExists { .. }));
    }
}
