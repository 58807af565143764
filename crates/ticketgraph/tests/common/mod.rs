//! Common test utilities shared across integration tests.
#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};
use std::sync::Arc;
use tempfile::TempDir;
use ticketgraph::domain::{CanonicalEdge, RelationKind, TicketId, TicketStatus, TicketSummary};
use ticketgraph::storage::{
    Backend, DEFAULT_BUSY_TIMEOUT, DependencyStore, StorageBackend, open_backend,
};

/// Backends every store-level test runs against
#[derive(Debug, Clone, Copy)]
pub enum Kind {
    Memory,
    Sqlite,
}

/// An opened backend plus the temporary directory keeping its file alive
pub struct TestBackend {
    pub backend: Backend,
    _dir: Option<TempDir>,
}

impl TestBackend {
    pub fn store(&self) -> Arc<dyn DependencyStore> {
        self.backend.store.clone()
    }
}

pub fn open(kind: Kind) -> TestBackend {
    match kind {
        Kind::Memory => TestBackend {
            backend: open_backend(&StorageBackend::InMemory).unwrap(),
            _dir: None,
        },
        Kind::Sqlite => {
            let dir = TempDir::new().unwrap();
            let backend = open_backend(&StorageBackend::Sqlite {
                path: dir.path().join("graph.db"),
                busy_timeout: DEFAULT_BUSY_TIMEOUT,
            })
            .unwrap();
            TestBackend {
                backend,
                _dir: Some(dir),
            }
        }
    }
}

pub fn blocks(from: &str, to: &str) -> CanonicalEdge {
    CanonicalEdge {
        from: TicketId::new(from),
        to: TicketId::new(to),
        kind: RelationKind::Blocks,
    }
}

pub fn related(from: &str, to: &str) -> CanonicalEdge {
    CanonicalEdge {
        from: TicketId::new(from),
        to: TicketId::new(to),
        kind: RelationKind::Related,
    }
}

pub fn ticket(id: &str) -> TicketSummary {
    ticket_with_status(id, TicketStatus::Open)
}

pub fn ticket_with_status(id: &str, status: TicketStatus) -> TicketSummary {
    TicketSummary {
        id: TicketId::new(id),
        title: format!("Ticket {id}"),
        status,
    }
}

/// Run the ticketgraph binary in the specified directory
pub fn run_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ticketgraph"))
        .args(args)
        .current_dir(dir)
        .env_remove("TICKETGRAPH_PROJECT")
        .env_remove("TICKETGRAPH_ACTOR")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute ticketgraph binary")
}
