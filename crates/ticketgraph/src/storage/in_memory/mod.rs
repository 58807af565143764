//! In-memory storage backend using petgraph.
//!
//! This module provides an **ephemeral** store where all edges are held in RAM
//! and **lost when the process exits**. It is suitable for:
//!
//! - Testing and development
//! - Embedding the engine where edges are persisted elsewhere
//!
//! # Architecture
//!
//! - `HashMap<ProjectId, ProjectGraph>` partitions edges by owning project
//! - `petgraph::StableDiGraph` per project for reachability and adjacency
//! - `BTreeMap<EdgeId, Edge>` per project keeps edge records in creation order
//!
//! # Thread Safety
//!
//! The storage is wrapped in `Arc<Mutex<InMemoryStoreInner>>`. Each operation
//! holds the lock for its whole duration, so the duplicate check, cycle check,
//! and insert of `create_edge` form one atomic unit.
//!
//! # Performance Characteristics
//!
//! - Create: O(v + e) of the project for the reachability check
//! - Delete: O(1) by edge id, O(e) when cascading a ticket
//! - Neighborhood: O(d) per visited ticket, d = ticket degree

mod graph;
mod inner;
mod trait_impl;

use crate::storage::DependencyStore;
use inner::InMemoryStoreInner;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Thread-safe in-memory storage.
///
/// Implements [`DependencyStore`] via the trait implementation in
/// `trait_impl.rs`.
pub(crate) type InMemoryStore = Arc<Mutex<InMemoryStoreInner>>;

/// Create a new in-memory store.
///
/// # Example
///
/// ```
/// use ticketgraph::storage::in_memory::new_in_memory_store;
///
/// let store = new_in_memory_store();
/// ```
#[must_use]
pub fn new_in_memory_store() -> Arc<dyn DependencyStore> {
    let store: InMemoryStore = Arc::new(Mutex::new(InMemoryStoreInner::new()));
    Arc::new(store)
}
