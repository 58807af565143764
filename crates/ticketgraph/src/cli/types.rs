//! CLI value enums and domain type conversions.

use clap::ValueEnum;

use crate::domain::{RequestedRelation, TicketStatus};

// ============================================================================
// Value Enums
// ============================================================================

/// Relation for `dep add`, phrased from the first ticket's perspective
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelationArg {
    /// The ticket blocks each related ticket
    #[default]
    Blocks,
    /// The ticket is blocked by each related ticket
    #[value(name = "blocked-by", alias = "blocked_by")]
    BlockedBy,
    /// Undirected association
    Related,
}

impl std::fmt::Display for RelationArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Blocks => write!(f, "blocks"),
            Self::BlockedBy => write!(f, "blocked-by"),
            Self::Related => write!(f, "related"),
        }
    }
}

/// Ticket status for CLI arguments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TicketStatusArg {
    /// Not started
    #[default]
    Open,
    /// Currently being worked on
    #[value(name = "in_progress", alias = "in-progress")]
    InProgress,
    /// Completed
    Closed,
}

impl std::fmt::Display for TicketStatusArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

// ============================================================================
// Domain Type Conversions
// ============================================================================

impl From<RelationArg> for RequestedRelation {
    fn from(arg: RelationArg) -> Self {
        match arg {
            RelationArg::Blocks => RequestedRelation::Blocks,
            RelationArg::BlockedBy => RequestedRelation::BlockedBy,
            RelationArg::Related => RequestedRelation::Related,
        }
    }
}

impl From<TicketStatusArg> for TicketStatus {
    fn from(arg: TicketStatusArg) -> Self {
        match arg {
            TicketStatusArg::Open => TicketStatus::Open,
            TicketStatusArg::InProgress => TicketStatus::InProgress,
            TicketStatusArg::Closed => TicketStatus::Closed,
        }
    }
}
