//! CLI argument structs for all commands.

use clap::{Parser, Subcommand};

use super::types::{RelationArg, TicketStatusArg};
use super::validators::{validate_edge_id, validate_project, validate_ticket_id, validate_title};

/// Arguments for the `init` command
#[derive(Parser, Debug, Clone)]
pub struct InitArgs {
    /// Project name written to the configuration
    ///
    /// 1-64 letters, digits, '-' or '_'. Defaults to "default".
    #[arg(short, long, value_parser = validate_project)]
    pub project: Option<String>,

    /// Suppress output messages
    #[arg(short, long)]
    pub quiet: bool,
}

/// Arguments for the `ticket` command
#[derive(Parser, Debug, Clone)]
pub struct TicketArgs {
    /// Ticket action to perform
    #[command(subcommand)]
    pub action: TicketAction,
}

/// Ticket registry actions
#[derive(Subcommand, Debug, Clone)]
pub enum TicketAction {
    /// Register a ticket, or update its title and status
    Add {
        /// Ticket ID
        #[arg(value_parser = validate_ticket_id)]
        id: String,

        /// Ticket title
        #[arg(short, long, value_parser = validate_title)]
        title: String,

        /// Ticket status
        #[arg(short, long, value_enum, default_value_t = TicketStatusArg::Open)]
        status: TicketStatusArg,
    },

    /// List registered tickets
    List,

    /// Remove a ticket and every dependency touching it
    Remove {
        /// Ticket ID
        #[arg(value_parser = validate_ticket_id)]
        id: String,
    },
}

/// Arguments for the `dep` command
#[derive(Parser, Debug, Clone)]
pub struct DepArgs {
    /// Dependency action to perform
    #[command(subcommand)]
    pub action: DepAction,
}

/// Dependency management actions
#[derive(Subcommand, Debug, Clone)]
pub enum DepAction {
    /// Add dependencies from one ticket to one or more others
    Add {
        /// Ticket the relation is phrased from
        #[arg(value_parser = validate_ticket_id)]
        ticket: String,

        /// Related tickets
        #[arg(required = true, num_args = 1.., value_parser = validate_ticket_id)]
        related: Vec<String>,

        /// Relation from `ticket` to each related ticket
        #[arg(short, long, value_enum, default_value_t = RelationArg::Blocks)]
        kind: RelationArg,
    },

    /// List dependencies of a ticket
    List {
        /// Ticket ID
        #[arg(value_parser = validate_ticket_id)]
        ticket: String,
    },

    /// Remove a dependency by ID
    Remove {
        /// Dependency ID as shown by `dep list`
        #[arg(value_parser = validate_edge_id)]
        edge_id: i64,

        /// A ticket at either end of the dependency
        #[arg(value_parser = validate_ticket_id)]
        ticket: String,
    },
}

/// Arguments for the `graph` command
#[derive(Parser, Debug, Clone, Default)]
pub struct GraphArgs {
    /// Show only the neighborhood of this ticket
    #[arg(short, long, value_parser = validate_ticket_id)]
    pub root: Option<String>,

    /// Neighborhood depth (clamped to 1-2; requires --root)
    #[arg(short, long, requires = "root")]
    pub depth: Option<u32>,
}

/// Arguments for the `blocked` command
#[derive(Parser, Debug, Clone, Default)]
pub struct BlockedArgs {}
