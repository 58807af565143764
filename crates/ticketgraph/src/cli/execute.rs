//! Command execution logic.

use anyhow::Result;
use serde::Serialize;

use super::args::{BlockedArgs, DepAction, DepArgs, GraphArgs, InitArgs, TicketAction, TicketArgs};
use crate::app::App;
use crate::domain::{EdgeId, RequestedRelation, TicketId, TicketSummary};
use crate::output::{self, OutputMode};
use crate::service::{DependencyRequest, DependencyView};

/// A batch entry that could not be applied
#[derive(Debug, Clone, Serialize)]
pub struct BatchError {
    /// Related ticket of the failed entry
    pub related: String,
    /// Error message
    pub error: String,
}

/// Outcome of `dep add` with several related tickets
#[derive(Debug, Default, Serialize)]
pub struct BatchResult {
    /// Dependencies that were created
    pub created: Vec<DependencyView>,
    /// Entries that were rejected
    pub failed: Vec<BatchError>,
}

impl BatchResult {
    /// Total number of processed entries
    #[must_use]
    pub fn total(&self) -> usize {
        self.created.len() + self.failed.len()
    }

    /// Returns `true` if any entry failed
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}

/// Execute the init command
///
/// # Errors
///
/// Returns an error if the workspace cannot be created or output fails.
pub async fn execute_init(args: &InitArgs, output_mode: OutputMode) -> Result<()> {
    use crate::commands::init;

    let current_dir = std::env::current_dir()?;
    let result = init::init(&current_dir, args.project.as_deref()).await?;

    match output_mode {
        OutputMode::Json => output::print_json(&serde_json::json!({
            "config_dir": result.config_dir.display().to_string(),
            "config_file": result.config_file.display().to_string(),
            "project": result.project,
            "backend": result.backend,
        }))?,
        OutputMode::Text if !args.quiet => {
            println!("Initialized ticketgraph in {}", result.config_dir.display());
            println!("  Config: {}", result.config_file.display());
            println!("  Project: {}", result.project);
        }
        OutputMode::Text => {}
    }

    Ok(())
}

/// Execute the ticket command
///
/// # Errors
///
/// Returns any registry, store or output error.
pub async fn execute_ticket(app: &App, args: &TicketArgs, output_mode: OutputMode) -> Result<()> {
    match &args.action {
        TicketAction::Add { id, title, status } => {
            let ticket = TicketSummary {
                id: TicketId::new(id),
                title: title.clone(),
                status: (*status).into(),
            };
            app.tickets().register(app.project(), ticket.clone()).await?;

            match output_mode {
                OutputMode::Json => output::print_json(&ticket)?,
                OutputMode::Text => println!("Registered ticket {id} [{status}]"),
            }
        }
        TicketAction::List => {
            let tickets = app.tickets().list(app.project()).await?;
            output::print_tickets(&tickets, output_mode)?;
        }
        TicketAction::Remove { id } => {
            let ticket = TicketId::new(id);
            if !app.tickets().remove(app.project(), &ticket).await? {
                anyhow::bail!("Ticket {id} not found in project {}", app.project());
            }
            let removed = app.service().ticket_deleted(app.project(), &ticket).await?;

            match output_mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "action": "remove",
                    "ticket": id,
                    "dependencies_removed": removed,
                }))?,
                OutputMode::Text => {
                    println!("Removed ticket {id} and {removed} dependency(ies)");
                }
            }
        }
    }
    Ok(())
}

/// Execute the dep command
///
/// # Errors
///
/// Returns any service or output error, or an error if an entry of a batch failed.
pub async fn execute_dep(app: &App, args: &DepArgs, output_mode: OutputMode) -> Result<()> {
    let service = app.service();

    match &args.action {
        DepAction::Add {
            ticket,
            related,
            kind,
        } => {
            let ticket_id = TicketId::new(ticket);
            let relation: RequestedRelation = (*kind).into();
            let requests: Vec<DependencyRequest> = related
                .iter()
                .map(|r| DependencyRequest {
                    related: TicketId::new(r),
                    relation,
                })
                .collect();

            let outcomes = service
                .create_dependencies(app.actor(), app.project(), &ticket_id, &requests)
                .await?;

            let mut result = BatchResult::default();
            for (request, outcome) in requests.iter().zip(outcomes) {
                match outcome {
                    Ok(view) => result.created.push(view),
                    Err(e) => result.failed.push(BatchError {
                        related: request.related.to_string(),
                        error: e.to_string(),
                    }),
                }
            }

            output_dep_batch(ticket, &result, output_mode)?;

            if result.has_failures() {
                anyhow::bail!(
                    "{} of {} dependency(ies) failed",
                    result.failed.len(),
                    result.total()
                );
            }
        }
        DepAction::List { ticket } => {
            let deps = service
                .list_dependencies(app.actor(), app.project(), &TicketId::new(ticket))
                .await?;
            output::print_dependencies(ticket, &deps, output_mode)?;
        }
        DepAction::Remove { edge_id, ticket } => {
            service
                .delete_dependency(
                    app.actor(),
                    app.project(),
                    EdgeId(*edge_id),
                    &TicketId::new(ticket),
                )
                .await?;

            match output_mode {
                OutputMode::Json => output::print_json(&serde_json::json!({
                    "action": "remove",
                    "id": edge_id,
                    "ticket": ticket,
                    "status": "success"
                }))?,
                OutputMode::Text => println!("Removed dependency #{edge_id} from {ticket}"),
            }
        }
    }
    Ok(())
}

fn output_dep_batch(ticket: &str, result: &BatchResult, output_mode: OutputMode) -> Result<()> {
    match output_mode {
        OutputMode::Json => output::print_json(result)?,
        OutputMode::Text => {
            let config = output::OutputConfig::from_env();
            for view in &result.created {
                println!(
                    "{} #{}: {} {} {}",
                    output::success("Added dependency", &config),
                    view.edge.id,
                    ticket,
                    view.relation,
                    view.related.id
                );
            }
            for failure in &result.failed {
                eprintln!(
                    "{} {} -> {}: {}",
                    output::error("Failed", &config),
                    ticket,
                    failure.related,
                    failure.error
                );
            }
        }
    }
    Ok(())
}

/// Execute the graph command
///
/// # Errors
///
/// Returns any service or output error.
pub async fn execute_graph(app: &App, args: &GraphArgs, output_mode: OutputMode) -> Result<()> {
    let root = args.root.as_deref().map(TicketId::new);

    if let (Some(_), Some(depth)) = (&root, args.depth) {
        let effective = crate::graph::clamp_depth(Some(depth));
        if effective != depth && output_mode == OutputMode::Text {
            let config = output::OutputConfig::from_env();
            let message = format!("Depth {depth} is out of range, using {effective}");
            eprintln!("{}", output::warning(&message, &config));
        }
    }

    let graph = app
        .service()
        .project_graph(app.actor(), app.project(), root.as_ref(), args.depth)
        .await?;
    output::print_graph(&graph, output_mode)?;
    Ok(())
}

/// Execute the blocked command
///
/// # Errors
///
/// Returns any service or output error.
pub async fn execute_blocked(
    app: &App,
    _args: &BlockedArgs,
    output_mode: OutputMode,
) -> Result<()> {
    let blocked = app
        .service()
        .blocked_tickets(app.actor(), app.project())
        .await?;
    output::print_blocked(&blocked, output_mode)?;
    Ok(())
}
