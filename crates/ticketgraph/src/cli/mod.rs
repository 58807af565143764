//! CLI argument parsing and command dispatch.
//!
//! # Commands
//!
//! - `init`: Create `.ticketgraph/` in the current directory
//! - `ticket`: Register, list and remove tickets
//! - `dep`: Add, list and remove dependencies
//! - `graph`: Show the project graph or a ticket's neighborhood
//! - `blocked`: Show tickets held back by open blockers
//!
//! # Global Flags
//!
//! - `--json`: Output in JSON format
//! - `--project`: Override the configured project (`TICKETGRAPH_PROJECT`)
//! - `--actor`: Identity recorded on created dependencies (`TICKETGRAPH_ACTOR`)
//!
//! # Example
//!
//! ```bash
//! ticketgraph ticket add web-1 --title "Login page"
//! ticketgraph ticket add web-2 --title "Session store"
//! ticketgraph dep add web-1 web-2 --kind blocked-by
//! ticketgraph graph --root web-1 --depth 2
//! ```

mod args;
mod execute;
mod types;
mod validators;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{BlockedArgs, DepAction, DepArgs, GraphArgs, InitArgs, TicketAction, TicketArgs};
pub use types::{RelationArg, TicketStatusArg};
pub use validators::{validate_edge_id, validate_project, validate_ticket_id, validate_title};

/// Ticketgraph - dependency tracking between tickets
///
/// Records blocking and related links between tickets of a project, rejects
/// links that would create a blocking cycle, and renders dependency graphs.
#[derive(Parser, Debug)]
#[command(name = "ticketgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Project to operate on instead of the configured one
    #[arg(long, global = true, env = "TICKETGRAPH_PROJECT", value_parser = validate_project)]
    pub project: Option<String>,

    /// Identity recorded on created dependencies
    #[arg(long, global = true, env = "TICKETGRAPH_ACTOR")]
    pub actor: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Initialize ticketgraph in the current directory
    ///
    /// Creates `.ticketgraph/` with a configuration file.
    Init(InitArgs),

    /// Manage the local ticket registry
    ///
    /// Dependencies can only be created between registered tickets.
    Ticket(TicketArgs),

    /// Manage dependencies between tickets
    Dep(DepArgs),

    /// Show the dependency graph
    ///
    /// Without `--root` every edge of the project is shown. With `--root`
    /// only tickets within `--depth` hops of the root are included.
    Graph(GraphArgs),

    /// Show blocked tickets
    ///
    /// Lists tickets with at least one blocker that is not closed.
    Blocked(BlockedArgs),
}

impl Cli {
    /// Parse CLI arguments from command line
    #[must_use]
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }

    /// Parse CLI arguments from an iterator (for testing)
    ///
    /// # Errors
    ///
    /// Returns the clap error for invalid arguments.
    pub fn try_parse_from<I, T>(iter: I) -> std::result::Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Execute the CLI command
    ///
    /// # Errors
    ///
    /// Returns any error from loading the workspace or running the command.
    pub async fn execute(&self) -> Result<()> {
        use crate::output::OutputMode;

        let output_mode = if self.json {
            OutputMode::Json
        } else {
            OutputMode::Text
        };

        match &self.command {
            Some(Commands::Init(args)) => execute::execute_init(args, output_mode).await,
            Some(Commands::Ticket(args)) => {
                let app = self.load_app().await?;
                execute::execute_ticket(&app, args, output_mode).await
            }
            Some(Commands::Dep(args)) => {
                let app = self.load_app().await?;
                execute::execute_dep(&app, args, output_mode).await
            }
            Some(Commands::Graph(args)) => {
                let app = self.load_app().await?;
                execute::execute_graph(&app, args, output_mode).await
            }
            Some(Commands::Blocked(args)) => {
                let app = self.load_app().await?;
                execute::execute_blocked(&app, args, output_mode).await
            }
            None => {
                println!("Ticketgraph dependency tracking");
                println!("Use --help for more information");
                Ok(())
            }
        }
    }

    async fn load_app(&self) -> Result<crate::app::App> {
        let app = crate::app::App::from_directory(&std::env::current_dir()?)
            .await?
            .with_project(self.project.as_deref())
            .with_actor(self.actor.as_deref());
        Ok(app)
    }
}
