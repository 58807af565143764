//! Cycle guard for blocking edges.
//!
//! Before a `from -> to` blocking edge is inserted, the guard asks the store
//! whether a blocking path `to -> ... -> from` already exists in the project.
//! If it does, the new edge would close a cycle and the write is refused.
//!
//! The guard never loads the graph itself. It runs against a [`ProjectView`],
//! which each backend implements over the same transaction (or lock scope)
//! that performs the insert, so the check and the write cannot be separated by
//! a concurrent writer.

use crate::domain::{CanonicalEdge, Edge, RelationKind, TicketId};
use crate::error::{Error, Result};

/// Read access to one project's edges within a single consistent snapshot.
pub trait ProjectView {
    /// Returns `true` if a directed path of `blocks` edges leads from `from`
    /// to `to`. A ticket always reaches itself.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the snapshot cannot be read.
    fn blocking_path_exists(&self, from: &TicketId, to: &TicketId) -> Result<bool>;

    /// All edges of either kind and direction touching `ticket`, ordered by
    /// creation.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the snapshot cannot be read.
    fn edges_touching(&self, ticket: &TicketId) -> Result<Vec<Edge>>;
}

/// Refuse `edge` if it would close a cycle of blocking edges.
///
/// `related` edges are accepted without consulting the view.
///
/// # Errors
///
/// - `Error::DependencyCycle` if a reverse blocking path exists
/// - Any error raised by the view's path query
pub fn ensure_acyclic(view: &impl ProjectView, edge: &CanonicalEdge) -> Result<()> {
    if edge.kind != RelationKind::Blocks {
        return Ok(());
    }

    if view.blocking_path_exists(&edge.to, &edge.from)? {
        tracing::warn!(
            from = %edge.from,
            to = %edge.to,
            "Rejected blocking edge: would create a cycle"
        );
        return Err(Error::DependencyCycle {
            from: edge.from.clone(),
            to: edge.to.clone(),
        });
    }

    Ok(())
}
