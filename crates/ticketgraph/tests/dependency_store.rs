//! Integration tests for the dependency store.
//!
//! Every test runs against both backends so they stay behaviorally
//! interchangeable: duplicate detection, cycle rejection, scoped deletion,
//! and graph queries.

mod common;

use common::{Kind, blocks, open, related};
use rstest::rstest;
use ticketgraph::domain::{
    CanonicalEdge, Edge, EdgeId, ProjectId, RelationKind, RequestedRelation, TicketId,
};
use ticketgraph::error::{Error, Result};
use ticketgraph::graph::{self, GraphScope};
use ticketgraph::normalize::normalize;
use ticketgraph::storage::DependencyStore;

fn project() -> ProjectId {
    ProjectId::new("web")
}

fn id(s: &str) -> TicketId {
    TicketId::new(s)
}

async fn try_add(store: &dyn DependencyStore, edge: CanonicalEdge) -> Result<Edge> {
    store.create_edge(&project(), edge, None).await
}

async fn add(store: &dyn DependencyStore, edge: CanonicalEdge) -> Edge {
    try_add(store, edge).await.unwrap()
}

// ========== Creation ==========

#[rstest]
#[case::memory(Kind::Memory)]
#[case::sqlite(Kind::Sqlite)]
#[tokio::test]
async fn test_create_returns_materialized_edge(#[case] kind: Kind) {
    let backend = open(kind);
    let store = backend.store();

    let edge = store
        .create_edge(&project(), blocks("a", "b"), Some("alice".into()))
        .await
        .unwrap();

    assert_eq!(edge.project_id, project());
    assert_eq!(edge.from_ticket, id("a"));
    assert_eq!(edge.to_ticket, id("b"));
    assert_eq!(edge.kind, RelationKind::Blocks);
    assert_eq!(edge.created_by.as_ref().map(|a| a.as_str()), Some("alice"));

    let listed = store.list_edges_for_ticket(&project(), &id("b")).await;
    assert_eq!(listed.unwrap(), vec![edge]);
}

#[rstest]
#[case::memory(Kind::Memory)]
#[case::sqlite(Kind::Sqlite)]
#[tokio::test]
async fn test_blocked_by_then_blocks_is_duplicate(#[case] kind: Kind) {
    let backend = open(kind);
    let store = backend.store();

    let first = normalize(&id("a"), &id("b"), RequestedRelation::BlockedBy).unwrap();
    add(store.as_ref(), first).await;

    let second = normalize(&id("b"), &id("a"), RequestedRelation::Blocks).unwrap();
    let err = try_add(store.as_ref(), second).await.unwrap_err();
    assert!(matches!(err, Error::AlreadyExists { .. }), "got {err:?}");
}

#[rstest]
#[case::memory(Kind::Memory)]
#[case::sqlite(Kind::Sqlite)]
#[tokio::test]
async fn test_related_is_deduplicated_in_both_orders(#[case] kind: Kind) {
    let backend = open(kind);
    let store = backend.store();

    let first = normalize(&id("a"), &id("b"), RequestedRelation::Related).unwrap();
    add(store.as_ref(), first).await;

    let second = normalize(&id("b"), &id("a"), RequestedRelation::Related).unwrap();
    let err = try_add(store.as_ref(), second).await.unwrap_err();
    assert!(matches!(err, Error::AlreadyExists { .. }), "got {err:?}");
}

#[rstest]
#[case::memory(Kind::Memory)]
#[case::sqlite(Kind::Sqlite)]
#[tokio::test]
async fn test_blocks_and_related_may_coexist(#[case] kind: Kind) {
    let backend = open(kind);
    let store = backend.store();

    add(store.as_ref(), blocks("a", "b")).await;
    add(store.as_ref(), related("a", "b")).await;

    assert_eq!(store.project_edges(&project()).await.unwrap().len(), 2);
}

#[rstest]
#[case::memory(Kind::Memory)]
#[case::sqlite(Kind::Sqlite)]
#[tokio::test]
async fn test_self_loop_is_rejected_by_store(#[case] kind: Kind) {
    let backend = open(kind);
    let store = backend.store();

    let err = try_add(store.as_ref(), blocks("a", "a")).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

// ========== Cycle Guard ==========

#[rstest]
#[case::memory(Kind::Memory)]
#[case::sqlite(Kind::Sqlite)]
#[tokio::test]
async fn test_three_cycle_is_rejected_and_store_unchanged(#[case] kind: Kind) {
    let backend = open(kind);
    let store = backend.store();

    add(store.as_ref(), blocks("a", "b")).await;
    add(store.as_ref(), blocks("b", "c")).await;
    let before = store.project_edges(&project()).await.unwrap();

    let err = try_add(store.as_ref(), blocks("c", "a")).await.unwrap_err();
    match err {
        Error::DependencyCycle { from, to } => {
            assert_eq!(from, id("c"));
            assert_eq!(to, id("a"));
        }
        other => panic!("expected DependencyCycle, got {other:?}"),
    }

    assert_eq!(store.project_edges(&project()).await.unwrap(), before);
}

#[rstest]
#[case::memory(Kind::Memory)]
#[case::sqlite(Kind::Sqlite)]
#[tokio::test]
async fn test_related_edges_never_form_cycles(#[case] kind: Kind) {
    let backend = open(kind);
    let store = backend.store();

    add(store.as_ref(), blocks("a", "b")).await;
    add(store.as_ref(), related("a", "b")).await;
    add(store.as_ref(), related("b", "c")).await;
    add(store.as_ref(), related("a", "c")).await;

    // A related path b~c~a does not make c -> a a cycle through blocks
    add(store.as_ref(), blocks("c", "a")).await;
}

#[rstest]
#[case::memory(Kind::Memory)]
#[case::sqlite(Kind::Sqlite)]
#[tokio::test]
async fn test_cycles_are_checked_per_project(#[case] kind: Kind) {
    let backend = open(kind);
    let store = backend.store();
    let other = ProjectId::new("ops");

    add(store.as_ref(), blocks("a", "b")).await;
    store
        .create_edge(&other, blocks("b", "a"), None)
        .await
        .unwrap();

    assert_eq!(store.project_edges(&other).await.unwrap().len(), 1);
}

#[rstest]
#[case::memory(Kind::Memory)]
#[case::sqlite(Kind::Sqlite)]
#[tokio::test]
async fn test_deleting_an_edge_reopens_the_reverse_direction(#[case] kind: Kind) {
    let backend = open(kind);
    let store = backend.store();

    let edge = add(store.as_ref(), blocks("a", "b")).await;
    store
        .delete_edge(edge.id, &project(), &id("a"))
        .await
        .unwrap();

    add(store.as_ref(), blocks("b", "a")).await;
}

// ========== Scoped Deletion ==========

#[rstest]
#[case::memory(Kind::Memory)]
#[case::sqlite(Kind::Sqlite)]
#[tokio::test]
async fn test_delete_is_scoped(#[case] kind: Kind) {
    let backend = open(kind);
    let store = backend.store();
    let edge = add(store.as_ref(), blocks("a", "b")).await;

    let unknown = store
        .delete_edge(EdgeId(edge.id.as_i64() + 100), &project(), &id("a"))
        .await;
    assert!(matches!(unknown, Err(Error::NotFound(_))));

    let wrong_ticket = store.delete_edge(edge.id, &project(), &id("c")).await;
    assert!(matches!(wrong_ticket, Err(Error::NotFound(_))));

    let wrong_project = store
        .delete_edge(edge.id, &ProjectId::new("ops"), &id("a"))
        .await;
    assert!(matches!(wrong_project, Err(Error::NotFound(_))));

    // Either endpoint may delete
    store
        .delete_edge(edge.id, &project(), &id("b"))
        .await
        .unwrap();

    let again = store.delete_edge(edge.id, &project(), &id("b")).await;
    assert!(matches!(again, Err(Error::NotFound(_))));
    assert!(store.project_edges(&project()).await.unwrap().is_empty());
}

#[rstest]
#[case::memory(Kind::Memory)]
#[case::sqlite(Kind::Sqlite)]
#[tokio::test]
async fn test_delete_edges_for_ticket_cascades(#[case] kind: Kind) {
    let backend = open(kind);
    let store = backend.store();
    add(store.as_ref(), blocks("a", "b")).await;
    add(store.as_ref(), related("b", "c")).await;
    add(store.as_ref(), blocks("c", "d")).await;

    let removed = store
        .delete_edges_for_ticket(&project(), &id("b"))
        .await
        .unwrap();
    assert_eq!(removed, 2);

    let remaining = store.project_edges(&project()).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].from_ticket, id("c"));
}

// ========== Listing ==========

#[rstest]
#[case::memory(Kind::Memory)]
#[case::sqlite(Kind::Sqlite)]
#[tokio::test]
async fn test_list_returns_both_directions_in_creation_order(#[case] kind: Kind) {
    let backend = open(kind);
    let store = backend.store();
    let first = add(store.as_ref(), blocks("a", "b")).await;
    let second = add(store.as_ref(), blocks("b", "c")).await;
    let third = add(store.as_ref(), related("b", "d")).await;
    add(store.as_ref(), blocks("c", "d")).await;

    let ids: Vec<EdgeId> = store
        .list_edges_for_ticket(&project(), &id("b"))
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(ids, vec![first.id, second.id, third.id]);
}

#[rstest]
#[case::memory(Kind::Memory)]
#[case::sqlite(Kind::Sqlite)]
#[tokio::test]
async fn test_list_for_unknown_ticket_is_empty(#[case] kind: Kind) {
    let backend = open(kind);
    let edges = backend
        .store()
        .list_edges_for_ticket(&project(), &id("nobody"))
        .await
        .unwrap();
    assert!(edges.is_empty());
}

// ========== Graph Queries ==========

async fn chain(store: &dyn DependencyStore) {
    add(store, blocks("a", "b")).await;
    add(store, blocks("b", "c")).await;
    add(store, blocks("c", "d")).await;
}

#[rstest]
#[case::memory(Kind::Memory)]
#[case::sqlite(Kind::Sqlite)]
#[tokio::test]
async fn test_neighborhood_depth_one(#[case] kind: Kind) {
    let backend = open(kind);
    let store = backend.store();
    chain(store.as_ref()).await;

    let scope = GraphScope::Neighborhood {
        root: id("b"),
        depth: Some(1),
    };
    let graph = graph::query_graph(store.as_ref(), &project(), &scope)
        .await
        .unwrap();

    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(graph.nodes[0].ticket, id("b"));
    assert_eq!(graph.depth_of(&id("b")), Some(0));
    assert_eq!(graph.depth_of(&id("a")), Some(1));
    assert_eq!(graph.depth_of(&id("c")), Some(1));
    assert_eq!(graph.depth_of(&id("d")), None);

    let pairs: Vec<(&str, &str)> = graph
        .edges
        .iter()
        .map(|e| (e.from_ticket.as_str(), e.to_ticket.as_str()))
        .collect();
    assert_eq!(pairs, vec![("a", "b"), ("b", "c")]);
}

#[rstest]
#[case::memory(Kind::Memory)]
#[case::sqlite(Kind::Sqlite)]
#[tokio::test]
async fn test_neighborhood_depth_two(#[case] kind: Kind) {
    let backend = open(kind);
    let store = backend.store();
    chain(store.as_ref()).await;

    let scope = GraphScope::Neighborhood {
        root: id("b"),
        depth: Some(2),
    };
    let graph = graph::query_graph(store.as_ref(), &project(), &scope)
        .await
        .unwrap();

    assert_eq!(graph.nodes.len(), 4);
    assert_eq!(graph.depth_of(&id("d")), Some(2));
    assert_eq!(graph.edges.len(), 3);
}

#[rstest]
#[case::memory(Kind::Memory, Some(0), 1)]
#[case::sqlite(Kind::Sqlite, Some(0), 1)]
#[case::memory_default(Kind::Memory, None, 1)]
#[case::memory_large(Kind::Memory, Some(50), 2)]
#[case::sqlite_large(Kind::Sqlite, Some(50), 2)]
#[tokio::test]
async fn test_neighborhood_depth_is_clamped(
    #[case] kind: Kind,
    #[case] requested: Option<u32>,
    #[case] effective: u32,
) {
    let backend = open(kind);
    let store = backend.store();
    chain(store.as_ref()).await;

    let scope = GraphScope::Neighborhood {
        root: id("a"),
        depth: requested,
    };
    let graph = graph::query_graph(store.as_ref(), &project(), &scope)
        .await
        .unwrap();

    let max = graph.nodes.iter().map(|n| n.depth).max();
    assert_eq!(max, Some(effective));
}

#[rstest]
#[case::memory(Kind::Memory)]
#[case::sqlite(Kind::Sqlite)]
#[tokio::test]
async fn test_isolated_root_yields_single_node(#[case] kind: Kind) {
    let backend = open(kind);
    let store = backend.store();
    chain(store.as_ref()).await;

    let scope = GraphScope::Neighborhood {
        root: id("lonely"),
        depth: Some(2),
    };
    let graph = graph::query_graph(store.as_ref(), &project(), &scope)
        .await
        .unwrap();

    assert_eq!(graph.nodes.len(), 1);
    assert_eq!(graph.nodes[0].ticket, id("lonely"));
    assert_eq!(graph.nodes[0].depth, 0);
    assert!(graph.edges.is_empty());
}

#[rstest]
#[case::memory(Kind::Memory)]
#[case::sqlite(Kind::Sqlite)]
#[tokio::test]
async fn test_project_overlay_contains_every_edge(#[case] kind: Kind) {
    let backend = open(kind);
    let store = backend.store();
    add(store.as_ref(), blocks("a", "b")).await;
    add(store.as_ref(), related("c", "d")).await;
    store
        .create_edge(&ProjectId::new("ops"), blocks("x", "y"), None)
        .await
        .unwrap();

    let graph = graph::query_graph(store.as_ref(), &project(), &GraphScope::Project)
        .await
        .unwrap();

    assert_eq!(graph.edges.len(), 2);
    let mut nodes: Vec<&str> = graph.nodes.iter().map(|n| n.ticket.as_str()).collect();
    nodes.sort_unstable();
    assert_eq!(nodes, vec!["a", "b", "c", "d"]);
    assert!(graph.nodes.iter().all(|n| n.depth == 0));
}

#[rstest]
#[case::memory(Kind::Memory)]
#[case::sqlite(Kind::Sqlite)]
#[tokio::test]
async fn test_empty_project_overlay(#[case] kind: Kind) {
    let backend = open(kind);
    let graph = graph::query_graph(backend.store().as_ref(), &project(), &GraphScope::Project)
        .await
        .unwrap();
    assert!(graph.nodes.is_empty());
    assert!(graph.edges.is_empty());
}
