//! Domain types for the ticket dependency graph.
//!
//! Identifiers are opaque to the engine beyond equality and ordering. The only
//! persisted entity is the [`Edge`]; tickets are referenced weakly by id and
//! described by [`TicketSummary`] values supplied by the ticket directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new identifier
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier as a string slice
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns `true` for the nil sentinel (empty or whitespace only)
            #[must_use]
            pub fn is_blank(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Unique identifier for a ticket
    TicketId
);

string_id!(
    /// Identifier of the project that owns tickets and edges
    ProjectId
);

string_id!(
    /// Identifier of the actor performing an operation
    ActorId
);

/// Store-generated identifier of a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub i64);

impl EdgeId {
    /// Get the raw database value
    #[must_use]
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EdgeId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Stored kind of a dependency edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    /// `from` blocks `to`; participates in the acyclicity invariant
    Blocks,

    /// Informational link; undirected in meaning
    Related,
}

impl RelationKind {
    /// Database and wire representation
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blocks => "blocks",
            Self::Related => "related",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blocks" => Ok(Self::Blocks),
            "related" => Ok(Self::Related),
            other => Err(Error::InvalidInput(format!(
                "unknown relation kind '{other}'. Valid kinds: blocks, related"
            ))),
        }
    }
}

/// Relation as phrased by a caller, before canonicalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestedRelation {
    /// The first ticket blocks the second
    Blocks,

    /// The first ticket is blocked by the second
    BlockedBy,

    /// The two tickets are related
    Related,
}

impl fmt::Display for RequestedRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blocks => write!(f, "blocks"),
            Self::BlockedBy => write!(f, "blocked_by"),
            Self::Related => write!(f, "related"),
        }
    }
}

impl FromStr for RequestedRelation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blocks" => Ok(Self::Blocks),
            "blocked_by" | "blocked-by" => Ok(Self::BlockedBy),
            "related" => Ok(Self::Related),
            other => Err(Error::InvalidInput(format!(
                "unknown relation '{other}'. Valid relations: blocks, blocked_by, related"
            ))),
        }
    }
}

/// The one stored representation of a semantic relationship.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalEdge {
    /// Source ticket
    pub from: TicketId,

    /// Target ticket
    pub to: TicketId,

    /// Stored relation kind
    pub kind: RelationKind,
}

/// A stored dependency edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique edge identifier
    pub id: EdgeId,

    /// Owning project
    pub project_id: ProjectId,

    /// Source ticket (the blocker for `blocks` edges)
    pub from_ticket: TicketId,

    /// Target ticket (the blocked ticket for `blocks` edges)
    pub to_ticket: TicketId,

    /// Relation kind
    pub kind: RelationKind,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Actor that created the edge, if known
    pub created_by: Option<ActorId>,
}

impl Edge {
    /// Returns `true` if either endpoint is `ticket`.
    #[must_use]
    pub fn touches(&self, ticket: &TicketId) -> bool {
        &self.from_ticket == ticket || &self.to_ticket == ticket
    }

    /// The endpoint opposite to `ticket`, or `None` if the edge does not touch it.
    #[must_use]
    pub fn other_endpoint(&self, ticket: &TicketId) -> Option<&TicketId> {
        if &self.from_ticket == ticket {
            Some(&self.to_ticket)
        } else if &self.to_ticket == ticket {
            Some(&self.from_ticket)
        } else {
            None
        }
    }

    /// The relation as seen from `ticket`.
    ///
    /// A `blocks` edge reads as `Blocks` from its source and `BlockedBy` from
    /// its target. `related` edges read the same from both ends.
    #[must_use]
    pub fn relation_from(&self, ticket: &TicketId) -> Option<RequestedRelation> {
        match self.kind {
            RelationKind::Related if self.touches(ticket) => Some(RequestedRelation::Related),
            RelationKind::Blocks if &self.from_ticket == ticket => Some(RequestedRelation::Blocks),
            RelationKind::Blocks if &self.to_ticket == ticket => Some(RequestedRelation::BlockedBy),
            _ => None,
        }
    }

    /// The canonical triple of this edge.
    #[must_use]
    pub fn canonical(&self) -> CanonicalEdge {
        CanonicalEdge {
            from: self.from_ticket.clone(),
            to: self.to_ticket.clone(),
            kind: self.kind,
        }
    }
}

/// Workflow status of a ticket, as reported by the ticket directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Not started
    Open,

    /// Being worked on
    InProgress,

    /// Done; a closed blocker no longer blocks
    Closed,
}

impl TicketStatus {
    /// Database and wire representation
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::InProgress => "in_progress",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TicketStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "in_progress" => Ok(Self::InProgress),
            "closed" => Ok(Self::Closed),
            other => Err(Error::InvalidInput(format!(
                "unknown ticket status '{other}'. Valid statuses: open, in_progress, closed"
            ))),
        }
    }
}

/// Summary of a ticket attached to edges and graph nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketSummary {
    /// Ticket identifier
    pub id: TicketId,

    /// Ticket title
    pub title: String,

    /// Current status
    pub status: TicketStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn edge(from: &str, to: &str, kind: RelationKind) -> Edge {
        Edge {
            id: EdgeId(1),
            project_id: ProjectId::new("p"),
            from_ticket: TicketId::new(from),
            to_ticket: TicketId::new(to),
            kind,
            created_at: Utc::now(),
            created_by: None,
        }
    }

    #[rstest]
    #[case("blocks", RequestedRelation::Blocks)]
    #[case("blocked_by", RequestedRelation::BlockedBy)]
    #[case("blocked-by", RequestedRelation::BlockedBy)]
    #[case("related", RequestedRelation::Related)]
    fn test_parse_requested_relation(#[case] input: &str, #[case] expected: RequestedRelation) {
        assert_eq!(input.parse::<RequestedRelation>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_relation_is_invalid_input() {
        let err = "parent-child".parse::<RequestedRelation>().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_blank_ids() {
        assert!(TicketId::new("").is_blank());
        assert!(TicketId::new("  \t").is_blank());
        assert!(!TicketId::new("proj-1").is_blank());
    }

    #[test]
    fn test_relation_from_perspective() {
        let blocks = edge("a", "b", RelationKind::Blocks);
        assert_eq!(
            blocks.relation_from(&TicketId::new("a")),
            Some(RequestedRelation::Blocks)
        );
        assert_eq!(
            blocks.relation_from(&TicketId::new("b")),
            Some(RequestedRelation::BlockedBy)
        );
        assert_eq!(blocks.relation_from(&TicketId::new("c")), None);

        let related = edge("a", "b", RelationKind::Related);
        assert_eq!(
            related.relation_from(&TicketId::new("b")),
            Some(RequestedRelation::Related)
        );
    }

    #[test]
    fn test_other_endpoint() {
        let e = edge("a", "b", RelationKind::Blocks);
        let (a, b) = (TicketId::new("a"), TicketId::new("b"));
        assert_eq!(e.other_endpoint(&a), Some(&b));
        assert_eq!(e.other_endpoint(&b), Some(&a));
        assert_eq!(e.other_endpoint(&TicketId::new("z")), None);
    }

    #[test]
    fn test_edge_serializes_kind_snake_case() {
        let json = serde_json::to_value(edge("a", "b", RelationKind::Blocks)).unwrap();
        assert_eq!(json["kind"], "blocks");
        assert_eq!(json["from_ticket"], "a");
        assert_eq!(json["id"], 1);
    }
}
