//! Acyclicity under concurrent writers and random edge sequences.

mod common;

use common::blocks;
use petgraph::algo::is_cyclic_directed;
use petgraph::graphmap::DiGraphMap;
use proptest::prelude::*;
use std::sync::Arc;
use tempfile::TempDir;
use ticketgraph::domain::{Edge, ProjectId, RelationKind, RequestedRelation, TicketId};
use ticketgraph::error::Error;
use ticketgraph::normalize::normalize;
use ticketgraph::storage::sqlite::SqliteStore;
use ticketgraph::storage::{DEFAULT_BUSY_TIMEOUT, DependencyStore, in_memory};
use tokio::sync::Barrier;

fn has_blocking_cycle(edges: &[Edge]) -> bool {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for edge in edges.iter().filter(|e| e.kind == RelationKind::Blocks) {
        graph.add_edge(edge.from_ticket.as_str(), edge.to_ticket.as_str(), ());
    }
    is_cyclic_directed(&graph)
}

// ========== Concurrent Writers ==========

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_racing_reverse_edges_on_separate_connections() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.db");
    let project = ProjectId::new("web");

    for _ in 0..20 {
        let first: Arc<dyn DependencyStore> =
            Arc::new(SqliteStore::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap());
        let second: Arc<dyn DependencyStore> =
            Arc::new(SqliteStore::open(&path, DEFAULT_BUSY_TIMEOUT).unwrap());
        let barrier = Arc::new(Barrier::new(2));

        let forward = {
            let (store, barrier, project) = (first.clone(), barrier.clone(), project.clone());
            tokio::spawn(async move {
                barrier.wait().await;
                store.create_edge(&project, blocks("a", "b"), None).await
            })
        };
        let backward = {
            let (store, barrier, project) = (second.clone(), barrier.clone(), project.clone());
            tokio::spawn(async move {
                barrier.wait().await;
                store.create_edge(&project, blocks("b", "a"), None).await
            })
        };

        let results = [forward.await.unwrap(), backward.await.unwrap()];
        let successes = results.iter().filter(|r| r.is_ok()).count();
        let cycles = results
            .iter()
            .filter(|r| matches!(r, Err(Error::DependencyCycle { .. })))
            .count();
        assert_eq!((successes, cycles), (1, 1), "results: {results:?}");

        let edges = first.project_edges(&project).await.unwrap();
        assert_eq!(edges.len(), 1);
        first
            .delete_edges_for_ticket(&project, &TicketId::new("a"))
            .await
            .unwrap();
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_on_shared_in_memory_store() {
    let store = in_memory::new_in_memory_store();
    let project = ProjectId::new("web");
    let tickets = ["a", "b", "c", "d", "e"];

    let mut handles = Vec::new();
    for from in tickets {
        for to in tickets {
            if from == to {
                continue;
            }
            let (store, project) = (store.clone(), project.clone());
            handles.push(tokio::spawn(async move {
                store.create_edge(&project, blocks(from, to), None).await
            }));
        }
    }
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) | Err(Error::DependencyCycle { .. }) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    let edges = store.project_edges(&project).await.unwrap();
    assert!(!has_blocking_cycle(&edges));
    // A complete order over five tickets
    assert_eq!(edges.len(), 10);
}

// ========== Random Sequences ==========

fn relation() -> impl Strategy<Value = RequestedRelation> {
    prop_oneof![
        Just(RequestedRelation::Blocks),
        Just(RequestedRelation::BlockedBy),
        Just(RequestedRelation::Related),
    ]
}

fn operations() -> impl Strategy<Value = Vec<(u8, u8, RequestedRelation)>> {
    prop::collection::vec((0u8..6, 0u8..6, relation()), 1..40)
}

async fn apply(store: &dyn DependencyStore, ops: &[(u8, u8, RequestedRelation)]) -> Vec<Edge> {
    let project = ProjectId::new("p");
    for (a, b, rel) in ops {
        let ticket = TicketId::new(format!("t{a}"));
        let other = TicketId::new(format!("t{b}"));
        let Ok(edge) = normalize(&ticket, &other, *rel) else {
            assert_eq!(a, b, "normalize only rejects self-loops here");
            continue;
        };
        match store.create_edge(&project, edge, None).await {
            Ok(_) | Err(Error::DependencyCycle { .. } | Error::AlreadyExists { .. }) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    store.project_edges(&project).await.unwrap()
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_in_memory_store_never_holds_a_cycle(ops in operations()) {
        let runtime = runtime();
        let store = in_memory::new_in_memory_store();
        let edges = runtime.block_on(apply(store.as_ref(), &ops));
        prop_assert!(!has_blocking_cycle(&edges));
    }

    #[test]
    fn prop_sqlite_store_never_holds_a_cycle(ops in operations()) {
        let runtime = runtime();
        let store = SqliteStore::open_in_memory().unwrap();
        let edges = runtime.block_on(apply(&store, &ops));
        prop_assert!(!has_blocking_cycle(&edges));
    }

    #[test]
    fn prop_backends_agree(ops in operations()) {
        let runtime = runtime();
        let memory = in_memory::new_in_memory_store();
        let sqlite = SqliteStore::open_in_memory().unwrap();

        let canonical = |edges: Vec<Edge>| -> Vec<_> {
            edges.into_iter().map(|e| e.canonical()).collect()
        };
        let from_memory = canonical(runtime.block_on(apply(memory.as_ref(), &ops)));
        let from_sqlite = canonical(runtime.block_on(apply(&sqlite, &ops)));
        prop_assert_eq!(from_memory, from_sqlite);
    }
}
