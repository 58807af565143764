//! Per-project dependency graph using petgraph.
//!
//! Edge direction follows the stored canonical form: `from -> to`. For
//! `blocks` edges the source is the blocker and the target is the blocked
//! ticket. `related` edges are stored in their canonical direction but are
//! ignored by reachability.

use crate::domain::{CanonicalEdge, Edge, EdgeId, RelationKind, TicketId};
use crate::error::Result;
use crate::guard::ProjectView;
use petgraph::Direction;
use petgraph::algo;
use petgraph::stable_graph::{EdgeIndex, EdgeReference, NodeIndex, StableDiGraph};
use petgraph::visit::{EdgeFiltered, EdgeRef};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Weight carried by each graph edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct EdgeWeight {
    pub(super) id: EdgeId,
    pub(super) kind: RelationKind,
}

/// Edges of one project.
///
/// `StableDiGraph` keeps node and edge indices valid across removals, so the
/// index maps never need rebuilding.
#[derive(Debug, Default)]
pub(super) struct ProjectGraph {
    graph: StableDiGraph<TicketId, EdgeWeight>,

    /// Ticket to node lookup. A node is removed with its last edge.
    node_map: HashMap<TicketId, NodeIndex>,

    /// Edge records in id (creation) order, with their graph index.
    edges: BTreeMap<EdgeId, (Edge, EdgeIndex)>,
}

impl ProjectGraph {
    fn node(&mut self, ticket: &TicketId) -> NodeIndex {
        if let Some(&node) = self.node_map.get(ticket) {
            return node;
        }
        let node = self.graph.add_node(ticket.clone());
        self.node_map.insert(ticket.clone(), node);
        node
    }

    /// Returns `true` if the canonical edge is already stored.
    pub(super) fn contains(&self, edge: &CanonicalEdge) -> bool {
        let (Some(&from), Some(&to)) = (self.node_map.get(&edge.from), self.node_map.get(&edge.to))
        else {
            return false;
        };

        self.graph
            .edges_directed(from, Direction::Outgoing)
            .any(|e| e.target() == to && e.weight().kind == edge.kind)
    }

    /// Add a materialized edge. Callers run duplicate and cycle checks first.
    pub(super) fn insert(&mut self, edge: Edge) {
        let from = self.node(&edge.from_ticket);
        let to = self.node(&edge.to_ticket);
        let index = self.graph.add_edge(
            from,
            to,
            EdgeWeight {
                id: edge.id,
                kind: edge.kind,
            },
        );
        self.edges.insert(edge.id, (edge, index));
    }

    /// Remove `id` if it touches `ticket`.
    pub(super) fn remove_touching(&mut self, id: EdgeId, ticket: &TicketId) -> Option<Edge> {
        let touches = self
            .edges
            .get(&id)
            .is_some_and(|(edge, _)| edge.touches(ticket));
        if !touches {
            return None;
        }

        let (edge, index) = self.edges.remove(&id)?;
        self.graph.remove_edge(index);
        self.prune(&edge.from_ticket);
        self.prune(&edge.to_ticket);
        Some(edge)
    }

    /// Remove every edge touching `ticket`.
    pub(super) fn remove_all_touching(&mut self, ticket: &TicketId) -> usize {
        let ids: Vec<EdgeId> = self
            .edges
            .values()
            .filter(|(edge, _)| edge.touches(ticket))
            .map(|(edge, _)| edge.id)
            .collect();

        for id in &ids {
            if let Some((edge, index)) = self.edges.remove(id) {
                self.graph.remove_edge(index);
                self.prune(edge.other_endpoint(ticket).unwrap_or(ticket));
            }
        }
        self.prune(ticket);
        ids.len()
    }

    /// Drop the node for `ticket` once no edge touches it.
    fn prune(&mut self, ticket: &TicketId) {
        let Some(&node) = self.node_map.get(ticket) else {
            return;
        };
        if self.graph.neighbors_undirected(node).next().is_none() {
            self.graph.remove_node(node);
            self.node_map.remove(ticket);
        }
    }

    /// Number of tickets with at least one edge.
    #[cfg(test)]
    pub(super) fn ticket_count(&self) -> usize {
        debug_assert_eq!(self.graph.node_count(), self.node_map.len());
        self.node_map.len()
    }

    /// All edges in creation order.
    pub(super) fn all_edges(&self) -> Vec<Edge> {
        self.edges.values().map(|(edge, _)| edge.clone()).collect()
    }
}

impl ProjectView for ProjectGraph {
    fn blocking_path_exists(&self, from: &TicketId, to: &TicketId) -> Result<bool> {
        if from == to {
            return Ok(true);
        }
        let (Some(&from), Some(&to)) = (self.node_map.get(from), self.node_map.get(to)) else {
            return Ok(false);
        };

        let blocking = EdgeFiltered::from_fn(&self.graph, |edge: EdgeReference<'_, EdgeWeight>| {
            edge.weight().kind == RelationKind::Blocks
        });
        Ok(algo::has_path_connecting(&blocking, from, to, None))
    }

    fn edges_touching(&self, ticket: &TicketId) -> Result<Vec<Edge>> {
        let Some(&node) = self.node_map.get(ticket) else {
            return Ok(vec![]);
        };

        let ids: BTreeSet<EdgeId> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .chain(self.graph.edges_directed(node, Direction::Incoming))
            .map(|e| e.weight().id)
            .collect();

        Ok(ids
            .iter()
            .filter_map(|id| self.edges.get(id))
            .map(|(edge, _)| edge.clone())
            .collect())
    }
}
