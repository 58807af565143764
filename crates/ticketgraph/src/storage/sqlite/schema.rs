//! Database schema definition for the `SQLite` backend.

/// Database schema definition.
pub(crate) const SCHEMA: &str = r"
-- Dependency edges. Ticket ids are weak references: no foreign keys, since
-- tickets are owned by an external collaborator.
CREATE TABLE IF NOT EXISTS dependency_edges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    project_id TEXT NOT NULL,
    from_ticket TEXT NOT NULL,
    to_ticket TEXT NOT NULL,
    kind TEXT NOT NULL CHECK (kind IN ('blocks', 'related')),
    created_at TEXT NOT NULL,
    created_by TEXT,
    CHECK (from_ticket <> to_ticket),
    UNIQUE (project_id, from_ticket, to_ticket, kind)
);

CREATE INDEX IF NOT EXISTS idx_edges_from ON dependency_edges(project_id, from_ticket, kind);
CREATE INDEX IF NOT EXISTS idx_edges_to ON dependency_edges(project_id, to_ticket);

-- Minimal ticket registry used as the ticket directory by local tooling
CREATE TABLE IF NOT EXISTS tickets (
    project_id TEXT NOT NULL,
    id TEXT NOT NULL,
    title TEXT NOT NULL,
    status TEXT NOT NULL,
    PRIMARY KEY (project_id, id)
);
";
