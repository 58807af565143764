//! Dependency graph rendering for `ticketgraph graph`.
//!
//! Renders a node list followed by an edge list:
//!
//! ```text
//! Neighborhood of web-2 (depth 1): 3 ticket(s), 2 edge(s)
//!
//! Tickets:
//!   0 ○ web-2 [open] Session store
//!   1 ○ web-1 [open] Login page
//!   1 ◐ web-3 [in_progress] Cookie banner
//!
//! Edges:
//!   #1 web-1 ──blocks──▶ web-2
//!   #2 web-2 ──related── web-3
//! ```

use std::io::{self, Write};

use super::color::{bold, colorize_id, colorize_kind, dimmed};
use super::{OutputConfig, OutputMode, format_ticket, print_json};
use crate::domain::{Edge, RelationKind};
use crate::service::GraphView;

/// Print a graph query result
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_graph(graph: &GraphView, mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            write_graph_text(&mut io::stdout().lock(), graph, &config)
        }
        OutputMode::Json => print_json(graph),
    }
}

fn edge_connector(edge: &Edge, config: &OutputConfig) -> String {
    let label = edge.kind.as_str();
    let connector = match (edge.kind, config.use_ascii) {
        (RelationKind::Blocks, false) => format!("──{label}──▶"),
        (RelationKind::Related, false) => format!("──{label}──"),
        (RelationKind::Blocks, true) => format!("--{label}-->"),
        (RelationKind::Related, true) => format!("--{label}--"),
    };
    colorize_kind(&connector, edge.kind, config)
}

fn write_graph_text<W: Write>(
    w: &mut W,
    graph: &GraphView,
    config: &OutputConfig,
) -> io::Result<()> {
    let counts = format!(
        "{} ticket(s), {} edge(s)",
        graph.nodes.len(),
        graph.edges.len()
    );
    let header = match (&graph.root, graph.depth) {
        (Some(root), Some(depth)) => format!("Neighborhood of {root} (depth {depth}): {counts}"),
        (Some(root), None) => format!("Neighborhood of {root}: {counts}"),
        (None, _) => format!("Project graph: {counts}"),
    };
    writeln!(w, "{}", bold(&header, config))?;

    if graph.nodes.is_empty() {
        return Ok(());
    }

    writeln!(w)?;
    writeln!(w, "{}", bold("Tickets:", config))?;
    for node in &graph.nodes {
        if graph.root.is_some() {
            writeln!(
                w,
                "  {} {}",
                dimmed(&node.depth.to_string(), config),
                format_ticket(&node.ticket, config)
            )?;
        } else {
            writeln!(w, "  {}", format_ticket(&node.ticket, config))?;
        }
    }

    if graph.edges.is_empty() {
        return Ok(());
    }

    writeln!(w)?;
    writeln!(w, "{}", bold("Edges:", config))?;
    for edge in &graph.edges {
        writeln!(
            w,
            "  {} {} {} {}",
            dimmed(&format!("#{}", edge.id), config),
            colorize_id(edge.from_ticket.as_str(), config),
            edge_connector(edge, config),
            colorize_id(edge.to_ticket.as_str(), config)
        )?;
    }
    Ok(())
}
