//! `DependencyStore` trait implementation for in-memory storage.

use super::InMemoryStore;
use super::graph::ProjectGraph;
use crate::domain::{ActorId, CanonicalEdge, Edge, EdgeId, ProjectId, TicketId};
use crate::error::{Error, Result};
use crate::graph::{self, DependencyGraph};
use crate::guard;
use crate::storage::{DependencyStore, reject_self_loop};
use async_trait::async_trait;
use chrono::Utc;

#[async_trait]
impl DependencyStore for InMemoryStore {
    async fn create_edge(
        &self,
        project: &ProjectId,
        edge: CanonicalEdge,
        creator: Option<ActorId>,
    ) -> Result<Edge> {
        reject_self_loop(&edge)?;
        let mut inner = self.lock().await;

        if let Some(existing) = inner.projects.get(project) {
            if existing.contains(&edge) {
                return Err(Error::AlreadyExists {
                    from: edge.from,
                    to: edge.to,
                    kind: edge.kind,
                });
            }
            guard::ensure_acyclic(existing, &edge)?;
        }

        let created = Edge {
            id: inner.next_id(),
            project_id: project.clone(),
            from_ticket: edge.from,
            to_ticket: edge.to,
            kind: edge.kind,
            created_at: Utc::now(),
            created_by: creator,
        };
        inner
            .projects
            .entry(project.clone())
            .or_default()
            .insert(created.clone());

        tracing::debug!(
            edge_id = %created.id,
            project = %project,
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
        let mut inner = self.lock().await;

        inner
            .projects
            .get_mut(project)
            .and_then(|graph| graph.remove_touching(edge_id, ticket))
            .map(|_| ())
            .ok_or_else(|| Error::edge_not_found(edge_id, ticket))
    }

    async fn delete_edges_for_ticket(
        &self,
        project: &ProjectId,
        ticket: &TicketId,
    ) -> Result<usize> {
        let mut inner = self.lock().await;

        Ok(inner
            .projects
            .get_mut(project)
            .map_or(0, |graph| graph.remove_all_touching(ticket)))
    }

    async fn list_edges_for_ticket(
        &self,
        project: &ProjectId,
        ticket: &TicketId,
    ) -> Result<Vec<Edge>> {
        use crate::guard::ProjectView;

        let inner = self.lock().await;
        match inner.projects.get(project) {
            Some(graph) => graph.edges_touching(ticket),
            None => Ok(vec![]),
        }
    }

    async fn project_edges(&self, project: &ProjectId) -> Result<Vec<Edge>> {
        let inner = self.lock().await;
        Ok(inner
            .projects
            .get(project)
            .map(ProjectGraph::all_edges)
            .unwrap_or_default())
    }

    async fn neighborhood(
        &self,
        project: &ProjectId,
        root: &TicketId,
        depth: u32,
    ) -> Result<DependencyGraph> {
        let inner = self.lock().await;
        match inner.projects.get(project) {
            Some(project_graph) => graph::expand_neighborhood(project_graph, root, depth),
            None => graph::expand_neighborhood(&ProjectGraph::default(), root, depth),
        }
    }
}
