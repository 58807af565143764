//! Ticket collaborator seams.
//!
//! The engine does not own tickets. It consumes two capabilities from the
//! surrounding system:
//!
//! - [`TicketDirectory`]: resolve a ticket id within a project to a summary
//! - [`AccessPolicy`]: decide whether an actor may read or write a project
//!
//! [`TicketRegistry`] extends the directory with the minimal registration
//! operations used by the CLI and by tests.

use crate::domain::{ActorId, ProjectId, TicketId, TicketSummary};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

/// Resolves tickets by id within a project.
#[async_trait]
pub trait TicketDirectory: Send + Sync {
    /// Look up `ticket` in `project`.
    ///
    /// Returns `None` if the ticket does not exist or belongs to another
    /// project.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read.
    async fn lookup(&self, project: &ProjectId, ticket: &TicketId)
        -> Result<Option<TicketSummary>>;
}

/// A ticket directory that can also be written to.
#[async_trait]
pub trait TicketRegistry: TicketDirectory {
    /// Insert or replace a ticket summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be written.
    async fn register(&self, project: &ProjectId, ticket: TicketSummary) -> Result<()>;

    /// Remove a ticket. Returns `false` if it did not exist.
    ///
    /// Edges touching the ticket are not removed here; callers cascade through
    /// [`crate::service::DependencyService::ticket_deleted`].
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be written.
    async fn remove(&self, project: &ProjectId, ticket: &TicketId) -> Result<bool>;

    /// All tickets of a project, ordered by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry cannot be read.
    async fn list(&self, project: &ProjectId) -> Result<Vec<TicketSummary>>;
}

/// Kind of access requested from the [`AccessPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Queries
    Read,

    /// Mutations
    Write,
}

/// Authorization gate consulted before every service operation.
#[async_trait]
pub trait AccessPolicy: Send + Sync {
    /// Returns `true` if `actor` may perform `access` on `project`.
    ///
    /// # Errors
    ///
    /// Returns an error if the policy cannot reach a decision.
    async fn authorize(&self, actor: &ActorId, project: &ProjectId, access: Access)
        -> Result<bool>;
}

/// Policy that grants every request. Used by the local CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

#[async_trait]
impl AccessPolicy for AllowAll {
    async fn authorize(&self, _: &ActorId, _: &ProjectId, _: Access) -> Result<bool> {
        Ok(true)
    }
}

/// In-memory ticket registry.
#[derive(Debug, Default)]
pub struct InMemoryTickets {
    tickets: RwLock<HashMap<ProjectId, BTreeMap<TicketId, TicketSummary>>>,
}

impl InMemoryTickets {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TicketDirectory for InMemoryTickets {
    async fn lookup(&self, project: &ProjectId, id: &TicketId) -> Result<Option<TicketSummary>> {
        let tickets = self.tickets.read().await;
        Ok(tickets
            .get(project)
            .and_then(|by_id| by_id.get(id))
            .cloned())
    }
}

#[async_trait]
impl TicketRegistry for InMemoryTickets {
    async fn register(&self, project: &ProjectId, ticket: TicketSummary) -> Result<()> {
        let mut tickets = self.tickets.write().await;
        tickets
            .entry(project.clone())
            .or_default()
            .insert(ticket.id.clone(), ticket);
        Ok(())
    }

    async fn remove(&self, project: &ProjectId, ticket: &TicketId) -> Result<bool> {
        let mut tickets = self.tickets.write().await;
        Ok(tickets
            .get_mut(project)
            .is_some_and(|by_id| by_id.remove(ticket).is_some()))
    }

    async fn list(&self, project: &ProjectId) -> Result<Vec<TicketSummary>> {
        let tickets = self.tickets.read().await;
        Ok(tickets
            .get(project)
            .map(|by_id| by_id.values().cloned().collect())
            .unwrap_or_default())
    }
}
