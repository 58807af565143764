//! Relation normalization.
//!
//! Rewrites a caller-phrased `(ticket, related ticket, relation)` triple into
//! the single canonical edge that is stored for it:
//!
//! - `A blocks B`     -> `A -> B` (blocks)
//! - `A blocked_by B` -> `B -> A` (blocks)
//! - `A related B`    -> smaller id `->` larger id (related)
//!
//! Ordering for `related` is byte-wise lexicographic over the identifier
//! strings. The chosen direction carries no meaning beyond making `(A, B)` and
//! `(B, A)` collapse to the same stored pair.

use crate::domain::{CanonicalEdge, RelationKind, RequestedRelation, TicketId};
use crate::error::{Error, Result};

/// Normalize a requested relation into its canonical stored form.
///
/// # Errors
///
/// Returns `Error::InvalidInput` if either identifier is blank or both
/// identifiers are equal.
pub fn normalize(
    ticket: &TicketId,
    related: &TicketId,
    requested: RequestedRelation,
) -> Result<CanonicalEdge> {
    if ticket.is_blank() || related.is_blank() {
        return Err(Error::InvalidInput(
            "ticket identifiers must not be empty".to_string(),
        ));
    }

    if ticket == related {
        return Err(Error::InvalidInput(format!(
            "ticket {ticket} cannot depend on itself"
        )));
    }

    let (from, to, kind) = match requested {
        RequestedRelation::Blocks => (ticket, related, RelationKind::Blocks),
        RequestedRelation::BlockedBy => (related, ticket, RelationKind::Blocks),
        RequestedRelation::Related if ticket.as_str() <= related.as_str() => {
            (ticket, related, RelationKind::Related)
        }
        RequestedRelation::Related => (related, ticket, RelationKind::Related),
    };

    Ok(CanonicalEdge {
        from: from.clone(),
        to: to.clone(),
        kind,
    })
}
