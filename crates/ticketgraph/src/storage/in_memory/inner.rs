//! Core in-memory storage data structures.
//!
//! This module contains the inner storage structure that holds all data
//! and is wrapped in `Arc<Mutex<>>` for thread safety.

use super::graph::ProjectGraph;
use crate::domain::{EdgeId, ProjectId};
use std::collections::HashMap;

/// Inner storage structure (not thread-safe).
///
/// Every project owns its own graph; no edge crosses projects.
#[derive(Debug, Default)]
pub(crate) struct InMemoryStoreInner {
    /// Edge graphs indexed by project
    pub(super) projects: HashMap<ProjectId, ProjectGraph>,

    /// Last issued edge id
    last_id: i64,
}

impl InMemoryStoreInner {
    /// Create a new empty storage instance
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Issue the next edge id. Ids increase monotonically and are never reused.
    pub(super) fn next_id(&mut self) -> EdgeId {
        self.last_id += 1;
        EdgeId(self.last_id)
    }
}
