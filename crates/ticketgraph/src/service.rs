//! Dependency operations as exposed to callers.
//!
//! [`DependencyService`] is the transport-agnostic surface of the engine. It
//! authorizes each call, validates tickets against the ticket directory,
//! normalizes relations, delegates to the store, and attaches ticket
//! summaries to the results. A transport layer (HTTP, CLI, RPC) only has to
//! decode requests and map [`Error::status_code`] onto its own responses.

use crate::domain::{
    ActorId, Edge, EdgeId, ProjectId, RelationKind, RequestedRelation, TicketId, TicketStatus,
    TicketSummary,
};
use crate::error::{Error, Result};
use crate::graph::{self, GraphScope};
use crate::normalize::normalize;
use crate::storage::DependencyStore;
use crate::tickets::{Access, AccessPolicy, TicketDirectory};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// An edge as seen from one of its tickets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyView {
    /// The stored edge
    pub edge: Edge,

    /// Relation from the viewing ticket's perspective
    pub relation: RequestedRelation,

    /// Summary of the ticket at the other end
    pub related: TicketSummary,
}

/// A graph node resolved to its ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNodeView {
    /// Ticket summary
    pub ticket: TicketSummary,

    /// BFS depth from the root (0 in project overlays)
    pub depth: u32,
}

/// A graph query result with every node resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphView {
    /// Root ticket of a neighborhood query, `None` for project overlays
    pub root: Option<TicketId>,

    /// Effective depth of a neighborhood query
    pub depth: Option<u32>,

    /// Resolved nodes
    pub nodes: Vec<GraphNodeView>,

    /// Edges between resolved nodes
    pub edges: Vec<Edge>,
}

/// A ticket held back by at least one unfinished blocker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedTicket {
    /// The blocked ticket
    pub ticket: TicketSummary,

    /// Blockers that are not closed
    pub blockers: Vec<TicketSummary>,
}

/// One entry of a batch creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRequest {
    /// The other ticket
    pub related: TicketId,

    /// Relation as phrased by the caller
    pub relation: RequestedRelation,
}

/// Transport-agnostic dependency operations.
#[derive(Clone)]
pub struct DependencyService {
    store: Arc<dyn DependencyStore>,
    tickets: Arc<dyn TicketDirectory>,
    access: Arc<dyn AccessPolicy>,
}

impl std::fmt::Debug for DependencyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependencyService")
            .field("store", &"<dyn DependencyStore>")
            .field("tickets", &"<dyn TicketDirectory>")
            .field("access", &"<dyn AccessPolicy>")
            .finish()
    }
}

impl DependencyService {
    /// Assemble a service from its collaborators.
    #[must_use]
    pub fn new(
        store: Arc<dyn DependencyStore>,
        tickets: Arc<dyn TicketDirectory>,
        access: Arc<dyn AccessPolicy>,
    ) -> Self {
        Self {
            store,
            tickets,
            access,
        }
    }

    async fn authorize(&self, actor: &ActorId, project: &ProjectId, access: Access) -> Result<()> {
        if self.access.authorize(actor, project, access).await? {
            Ok(())
        } else {
            tracing::warn!(actor = %actor, project = %project, ?access, "Access denied");
            Err(Error::Forbidden {
                actor: actor.to_string(),
                project: project.to_string(),
            })
        }
    }

    async fn require_ticket(&self, project: &ProjectId, id: &TicketId) -> Result<TicketSummary> {
        self.tickets
            .lookup(project, id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("ticket {id} in project {project}")))
    }

    /// Create a dependency between `ticket` and `related`.
    ///
    /// # Errors
    ///
    /// - `Error::Forbidden` if the actor may not write the project
    /// - `Error::InvalidInput` for self-loops, blank ids, or a related ticket
    ///   outside the project
    /// - `Error::NotFound` if `ticket` is not in the project
    /// - `Error::DependencyCycle` if the edge would close a blocking cycle
    /// - `Error::AlreadyExists` if the canonical edge is already stored
    pub async fn create_dependency(
        &self,
        actor: &ActorId,
        project: &ProjectId,
        ticket: &TicketId,
        related: &TicketId,
        relation: RequestedRelation,
    ) -> Result<DependencyView> {
        self.authorize(actor, project, Access::Write).await?;
        self.create_authorized(actor, project, ticket, related, relation)
            .await
    }

    async fn create_authorized(
        &self,
        actor: &ActorId,
        project: &ProjectId,
        ticket: &TicketId,
        related: &TicketId,
        relation: RequestedRelation,
    ) -> Result<DependencyView> {
        let canonical = normalize(ticket, related, relation)?;

        self.require_ticket(project, ticket).await?;
        let related_summary = self.tickets.lookup(project, related).await?.ok_or_else(|| {
            Error::InvalidInput(format!(
                "related ticket {related} does not exist in project {project}"
            ))
        })?;

        let edge = self
            .store
            .create_edge(project, canonical, Some(actor.clone()))
            .await?;

        tracing::info!(
            edge_id = %edge.id,
            project = %project,
            ticket = %ticket,
            related = %related,
            %relation,
            "Created dependency"
        );

        Ok(DependencyView {
            edge,
            relation,
            related: related_summary,
        })
    }

    /// Create several dependencies for `ticket`.
    ///
    /// Each request is evaluated on its own: a rejected entry does not abort
    /// the others. Results are returned in request order.
    ///
    /// # Errors
    ///
    /// Returns `Error::Forbidden` for the whole batch if the actor may not
    /// write the project. Per-entry errors are reported in the result vector.
    pub async fn create_dependencies(
        &self,
        actor: &ActorId,
        project: &ProjectId,
        ticket: &TicketId,
        requests: &[DependencyRequest],
    ) -> Result<Vec<Result<DependencyView>>> {
        self.authorize(actor, project, Access::Write).await?;

        let mut results = Vec::with_capacity(requests.len());
        for request in requests {
            let result = self
                .create_authorized(actor, project, ticket, &request.related, request.relation)
                .await;
            if let Err(e) = &result {
                tracing::debug!(related = %request.related, error = %e, "Batch entry rejected");
            }
            results.push(result);
        }
        Ok(results)
    }

    /// List every dependency of `ticket`, annotated with the other ticket.
    ///
    /// Edges whose other endpoint no longer resolves are skipped.
    ///
    /// # Errors
    ///
    /// - `Error::Forbidden` if the actor may not read the project
    /// - `Error::NotFound` if `ticket` is not in the project
    pub async fn list_dependencies(
        &self,
        actor: &ActorId,
        project: &ProjectId,
        ticket: &TicketId,
    ) -> Result<Vec<DependencyView>> {
        self.authorize(actor, project, Access::Read).await?;
        self.require_ticket(project, ticket).await?;

        let edges = self.store.list_edges_for_ticket(project, ticket).await?;
        let mut views = Vec::with_capacity(edges.len());

        for edge in edges {
            let (Some(other), Some(relation)) =
                (edge.other_endpoint(ticket), edge.relation_from(ticket))
            else {
                continue;
            };
            let Some(related) = self.tickets.lookup(project, other).await? else {
                tracing::warn!(
                    edge_id = %edge.id,
                    ticket = %other,
                    "Skipping edge to unknown ticket"
                );
                continue;
            };
            views.push(DependencyView {
                edge,
                relation,
                related,
            });
        }

        Ok(views)
    }

    /// Delete a dependency of `ticket`.
    ///
    /// # Errors
    ///
    /// - `Error::Forbidden` if the actor may not write the project
    /// - `Error::NotFound` if the edge does not exist, belongs to another
    ///   project, or does not touch `ticket`
    pub async fn delete_dependency(
        &self,
        actor: &ActorId,
        project: &ProjectId,
        edge_id: EdgeId,
        ticket: &TicketId,
    ) -> Result<()> {
        self.authorize(actor, project, Access::Write).await?;
        self.store.delete_edge(edge_id, project, ticket).await?;

        tracing::info!(
            edge_id = %edge_id,
            project = %project,
            ticket = %ticket,
            "Deleted dependency"
        );
        Ok(())
    }

    /// Project dependency graph: the whole project, or a neighborhood of
    /// `root` when given.
    ///
    /// `depth` is clamped to `[1, 2]` and ignored without a root.
    ///
    /// # Errors
    ///
    /// - `Error::Forbidden` if the actor may not read the project
    /// - `Error::InvalidInput` if `root` is not a ticket of the project
    pub async fn project_graph(
        &self,
        actor: &ActorId,
        project: &ProjectId,
        root: Option<&TicketId>,
        depth: Option<u32>,
    ) -> Result<GraphView> {
        self.authorize(actor, project, Access::Read).await?;

        let scope = match root {
            Some(root) => {
                if self.tickets.lookup(project, root).await?.is_none() {
                    return Err(Error::InvalidInput(format!(
                        "root ticket {root} does not exist in project {project}"
                    )));
                }
                GraphScope::Neighborhood {
                    root: root.clone(),
                    depth,
                }
            }
            None => GraphScope::Project,
        };

        let graph = graph::query_graph(self.store.as_ref(), project, &scope).await?;

        let mut summaries: HashMap<TicketId, TicketSummary> = HashMap::new();
        let mut nodes = Vec::with_capacity(graph.nodes.len());
        for node in graph.nodes {
            match self.tickets.lookup(project, &node.ticket).await? {
                Some(summary) => {
                    summaries.insert(node.ticket, summary.clone());
                    nodes.push(GraphNodeView {
                        ticket: summary,
                        depth: node.depth,
                    });
                }
                None => {
                    tracing::warn!(ticket = %node.ticket, "Dropping unresolved ticket from graph");
                }
            }
        }

        let edges = graph
            .edges
            .into_iter()
            .filter(|e| {
                summaries.contains_key(&e.from_ticket) && summaries.contains_key(&e.to_ticket)
            })
            .collect();

        let (root, depth) = match scope {
            GraphScope::Neighborhood { root, depth } => {
                (Some(root), Some(graph::clamp_depth(depth)))
            }
            GraphScope::Project => (None, None),
        };

        Ok(GraphView {
            root,
            depth,
            nodes,
            edges,
        })
    }

    /// Tickets blocked by at least one blocker that is not closed.
    ///
    /// Closed tickets are never reported as blocked, and closed blockers are
    /// left out of `blockers`. Ordered by ticket id; blockers in edge creation
    /// order.
    ///
    /// # Errors
    ///
    /// Returns `Error::Forbidden` if the actor may not read the project.
    pub async fn blocked_tickets(
        &self,
        actor: &ActorId,
        project: &ProjectId,
    ) -> Result<Vec<BlockedTicket>> {
        self.authorize(actor, project, Access::Read).await?;

        let mut blockers_of: BTreeMap<TicketId, Vec<TicketId>> = BTreeMap::new();
        for edge in self.store.project_edges(project).await? {
            if edge.kind == RelationKind::Blocks {
                blockers_of
                    .entry(edge.to_ticket)
                    .or_default()
                    .push(edge.from_ticket);
            }
        }

        let mut blocked = Vec::new();
        for (ticket, blocker_ids) in blockers_of {
            let Some(summary) = self.tickets.lookup(project, &ticket).await? else {
                continue;
            };
            if summary.status == TicketStatus::Closed {
                continue;
            }

            let mut blockers = Vec::new();
            for id in &blocker_ids {
                let blocker = self.tickets.lookup(project, id).await?;
                blockers.extend(blocker.filter(|b| b.status != TicketStatus::Closed));
            }

            if !blockers.is_empty() {
                blocked.push(BlockedTicket {
                    ticket: summary,
                    blockers,
                });
            }
        }

        Ok(blocked)
    }

    /// Remove every dependency of a deleted ticket.
    ///
    /// Called by the ticket owner after deleting `ticket`. Returns the number
    /// of edges removed.
    ///
    /// # Errors
    ///
    /// Returns any store error.
    pub async fn ticket_deleted(&self, project: &ProjectId, ticket: &TicketId) -> Result<usize> {
        let removed = self.store.delete_edges_for_ticket(project, ticket).await?;
        tracing::info!(project = %project, ticket = %ticket, removed, "Cascaded ticket deletion");
        Ok(removed)
    }
}
