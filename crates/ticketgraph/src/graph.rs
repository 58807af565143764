//! Graph queries over the dependency edges of a project.
//!
//! Two query shapes are supported:
//!
//! - **Project overlay** ([`GraphScope::Project`]): every edge of the project
//!   and the distinct tickets they touch. Nodes carry no depth (reported as 0).
//! - **Neighborhood** ([`GraphScope::Neighborhood`]): breadth-first expansion
//!   from a root ticket, following edges in both directions, annotated with the
//!   depth at which each ticket was first reached.
//!
//! Neighborhood depth is clamped to `[MIN_DEPTH, MAX_DEPTH]`. The ceiling is a
//! presentation limit for focused views and is not meant to grow.
//!
//! Queries are stateless. Each call reads the store as of that call.

use crate::domain::{Edge, EdgeId, ProjectId, TicketId};
use crate::error::Result;
use crate::guard::ProjectView;
use crate::storage::DependencyStore;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

/// Smallest neighborhood depth.
pub const MIN_DEPTH: u32 = 1;

/// Largest neighborhood depth.
pub const MAX_DEPTH: u32 = 2;

/// Clamp a requested neighborhood depth to `[MIN_DEPTH, MAX_DEPTH]`.
///
/// An absent depth means [`MIN_DEPTH`].
#[must_use]
pub fn clamp_depth(requested: Option<u32>) -> u32 {
    requested.unwrap_or(MIN_DEPTH).clamp(MIN_DEPTH, MAX_DEPTH)
}

/// Shape of a graph query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphScope {
    /// Every edge in the project
    Project,

    /// Bounded expansion around one ticket
    Neighborhood {
        /// Ticket the expansion starts from
        root: TicketId,
        /// Requested depth, clamped before use
        depth: Option<u32>,
    },
}

/// A ticket in a query result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Ticket identifier
    pub ticket: TicketId,

    /// BFS depth from the root (0 for the root and for overlay nodes)
    pub depth: u32,
}

/// Nodes and edges returned by a graph query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyGraph {
    /// Tickets in discovery order (neighborhood) or id order (overlay)
    pub nodes: Vec<GraphNode>,

    /// Edges whose endpoints are both in `nodes`, in creation order
    pub edges: Vec<Edge>,
}

impl DependencyGraph {
    /// Depth of `ticket`, or `None` if it is not part of the graph.
    #[must_use]
    pub fn depth_of(&self, ticket: &TicketId) -> Option<u32> {
        self.nodes
            .iter()
            .find(|node| &node.ticket == ticket)
            .map(|node| node.depth)
    }
}

/// Build the project-wide overlay from a project's edges.
#[must_use]
pub fn overlay(edges: Vec<Edge>) -> DependencyGraph {
    let tickets: BTreeSet<&TicketId> = edges
        .iter()
        .flat_map(|edge| [&edge.from_ticket, &edge.to_ticket])
        .collect();

    let nodes = tickets
        .into_iter()
        .map(|ticket| GraphNode {
            ticket: ticket.clone(),
            depth: 0,
        })
        .collect();

    DependencyGraph { nodes, edges }
}

/// Breadth-first neighborhood expansion around `root`.
///
/// Edges are traversable in both directions. Tickets at the depth limit are
/// not expanded, but their edges are still read so that every edge between
/// two discovered tickets ends up in the result. A root without edges yields
/// a single node and no edges.
///
/// # Errors
///
/// Returns any error raised by the view.
pub fn expand_neighborhood(
    view: &impl ProjectView,
    root: &TicketId,
    depth: u32,
) -> Result<DependencyGraph> {
    let max_depth = depth.clamp(MIN_DEPTH, MAX_DEPTH);

    let mut depths: HashMap<TicketId, u32> = HashMap::from([(root.clone(), 0)]);
    let mut order = vec![root.clone()];
    let mut seen_edges: BTreeMap<EdgeId, Edge> = BTreeMap::new();
    let mut queue: VecDeque<(TicketId, u32)> = VecDeque::from([(root.clone(), 0)]);

    while let Some((ticket, level)) = queue.pop_front() {
        for edge in view.edges_touching(&ticket)? {
            if level < max_depth {
                let unseen = edge
                    .other_endpoint(&ticket)
                    .filter(|t| !depths.contains_key(*t));
                if let Some(next) = unseen {
                    depths.insert(next.clone(), level + 1);
                    order.push(next.clone());
                    queue.push_back((next.clone(), level + 1));
                }
            }
            seen_edges.entry(edge.id).or_insert(edge);
        }
    }

    let edges = seen_edges
        .into_values()
        .filter(|edge| {
            depths.contains_key(&edge.from_ticket) && depths.contains_key(&edge.to_ticket)
        })
        .collect();

    let nodes = order
        .into_iter()
        .map(|ticket| {
            let depth = depths[&ticket];
            GraphNode { ticket, depth }
        })
        .collect();

    Ok(DependencyGraph { nodes, edges })
}

/// Run a graph query against the store.
///
/// # Errors
///
/// Returns any error raised by the store.
pub async fn query_graph(
    store: &dyn DependencyStore,
    project: &ProjectId,
    scope: &GraphScope,
) -> Result<DependencyGraph> {
    match scope {
        GraphScope::Project => {
            let edges = store.project_edges(project).await?;
            tracing::debug!(project = %project, edges = edges.len(), "Built project overlay");
            Ok(overlay(edges))
        }
        GraphScope::Neighborhood { root, depth } => {
            let depth = clamp_depth(*depth);
            let graph = store.neighborhood(project, root, depth).await?;
            tracing::debug!(
                project = %project,
                root = %root,
                depth,
                nodes = graph.nodes.len(),
                edges = graph.edges.len(),
                "Expanded neighborhood"
            );
            Ok(graph)
        }
    }
}
