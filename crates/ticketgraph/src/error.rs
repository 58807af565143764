//! Error types for the ticket dependency graph engine.
//!
//! Errors fall into two groups:
//!
//! - **Domain errors** (`InvalidInput`, `Forbidden`, `NotFound`,
//!   `DependencyCycle`, `AlreadyExists`): business-rule outcomes that map to
//!   distinct client-facing results and are never retried.
//! - **Infrastructure errors** (`Database`, `Io`, `Internal`): opaque failures
//!   that a caller may retry with backoff. A retry must re-run the whole
//!   operation so the cycle check is evaluated fresh.

use crate::domain::{EdgeId, RelationKind, TicketId};
use thiserror::Error;

/// The error type for ticketgraph operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed request: self-loop, blank identifier, unknown relation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The access policy refused the operation.
    #[error("Actor '{actor}' may not access project '{project}'")]
    Forbidden {
        /// Actor that attempted the operation
        actor: String,
        /// Project the operation targeted
        project: String,
    },

    /// Referenced edge or ticket does not exist in the expected scope.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Creating the edge would close a cycle of blocking edges.
    #[error("Circular dependency: {from} -> {to} would create a cycle")]
    DependencyCycle {
        /// Source of the rejected blocking edge
        from: TicketId,
        /// Target of the rejected blocking edge
        to: TicketId,
    },

    /// The canonical edge is already stored.
    #[error("Dependency already exists: {from} --[{kind}]--> {to}")]
    AlreadyExists {
        /// Source of the duplicate edge
        from: TicketId,
        /// Target of the duplicate edge
        to: TicketId,
        /// Relation kind of the duplicate edge
        kind: RelationKind,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backing store operation failed.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal failure (poisoned lock, aborted blocking task).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build a `NotFound` error for an edge scoped to a ticket.
    pub(crate) fn edge_not_found(edge_id: EdgeId, ticket: &TicketId) -> Self {
        Self::NotFound(format!("dependency {edge_id} on ticket {ticket}"))
    }

    /// Returns `true` for domain errors (client-side outcomes).
    #[must_use]
    pub fn is_domain_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_)
                | Self::Forbidden { .. }
                | Self::NotFound(_)
                | Self::DependencyCycle { .. }
                | Self::AlreadyExists { .. }
        )
    }

    /// Returns `true` if the caller may retry the operation with backoff.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Io(_) | Self::Internal(_))
    }

    /// HTTP-style status code for a transport layer.
    ///
    /// Cycle rejections and duplicates both map to 409; callers that need to
    /// tell them apart match on the variant.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidInput(_) => 400,
            Self::Forbidden { .. } => 403,
            Self::NotFound(_) => 404,
            Self::DependencyCycle { .. } | Self::AlreadyExists { .. } => 409,
            Self::Config(_) | Self::Database(_) | Self::Io(_) | Self::Internal(_) => 500,
        }
    }
}

/// A specialized Result type for ticketgraph operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_errors_are_not_retryable() {
        let errors = [
            Error::InvalidInput("self-loop".into()),
            Error::NotFound("edge 1".into()),
            Error::DependencyCycle {
                from: TicketId::new("a"),
                to: TicketId::new("b"),
            },
            Error::AlreadyExists {
                from: TicketId::new("a"),
                to: TicketId::new("b"),
                kind: RelationKind::Blocks,
            },
        ];

        for err in &errors {
            assert!(err.is_domain_error(), "{err} should be a domain error");
            assert!(!err.is_retryable(), "{err} should not be retryable");
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::InvalidInput(String::new()).status_code(), 400);
        assert_eq!(Error::NotFound(String::new()).status_code(), 404);
        assert_eq!(
            Error::Forbidden {
                actor: "bob".into(),
                project: "p".into(),
            }
            .status_code(),
            403
        );
        assert_eq!(Error::Internal("boom".into()).status_code(), 500);
        assert!(Error::Internal("boom".into()).is_retryable());
    }

    #[test]
    fn test_cycle_message_names_both_tickets() {
        let err = Error::DependencyCycle {
            from: TicketId::new("proj-c"),
            to: TicketId::new("proj-a"),
        };
        let msg = err.to_string();
        assert!(msg.contains("proj-c"));
        assert!(msg.contains("proj-a"));
    }
}
