//! Output formatting for CLI commands.
//!
//! Every printer has a text form for terminals and a JSON form for scripts.
//! Text printers write to any `Write` so they can be tested against a buffer.
//!
//! Submodules:
//! - [`color`]: Color and styling helpers
//! - [`graph`]: Dependency graph rendering

pub mod color;
pub mod graph;

use crate::domain::TicketSummary;
use crate::service::{BlockedTicket, DependencyView};
use serde::Serialize;
use std::env;
use std::io::{self, Write};

pub use color::{error, success, warning};
pub use graph::print_graph;

use color::{bold, colored_status_icon, colorize_id, colorize_kind, colorize_status, dimmed};

// ============================================================================
// Output Configuration
// ============================================================================

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Whether to use ASCII-only icons and connectors instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create a new `OutputConfig` with explicit values.
    #[must_use]
    pub fn new(use_ascii: bool, use_colors: bool) -> Self {
        Self {
            use_ascii,
            use_colors,
        }
    }

    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `TICKETGRAPH_ASCII`: "1" or "true" for ASCII-only output
    /// - `NO_COLOR`: Standard env var to disable colors (any value)
    /// - `TICKETGRAPH_COLOR`: "0" or "false" to disable colors
    #[must_use]
    pub fn from_env() -> Self {
        let use_ascii = match env::var("TICKETGRAPH_ASCII") {
            Ok(v) if v == "1" || v.eq_ignore_ascii_case("true") => true,
            Ok(v) if v == "0" || v.eq_ignore_ascii_case("false") || v.is_empty() => false,
            Ok(v) => {
                tracing::warn!(
                    env_var = "TICKETGRAPH_ASCII",
                    value = %v,
                    "Invalid value (expected '1', 'true', '0', or 'false'), using default"
                );
                false
            }
            Err(_) => false,
        };

        // https://no-color.org/
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("TICKETGRAPH_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            use_ascii: false,
            use_colors: true,
        }
    }
}

/// Output format mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text format
    Text,
    /// JSON format for programmatic use
    Json,
}

// ============================================================================
// Public Dispatch Functions
// ============================================================================

/// Print registered tickets
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_tickets(tickets: &[TicketSummary], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            write_tickets_text(&mut io::stdout().lock(), tickets, &config)
        }
        OutputMode::Json => print_json(&tickets),
    }
}

/// Print the dependencies of `ticket`
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_dependencies(
    ticket: &str,
    deps: &[DependencyView],
    mode: OutputMode,
) -> io::Result<()> {
    match mode {
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            write_dependencies_text(&mut io::stdout().lock(), ticket, deps, &config)
        }
        OutputMode::Json => print_json(&serde_json::json!({
            "ticket": ticket,
            "dependencies": deps,
        })),
    }
}

/// Print blocked tickets with their open blockers
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_blocked(blocked: &[BlockedTicket], mode: OutputMode) -> io::Result<()> {
    match mode {
        OutputMode::Text => {
            let config = OutputConfig::from_env();
            write_blocked_text(&mut io::stdout().lock(), blocked, &config)
        }
        OutputMode::Json => print_json(&blocked),
    }
}

/// Print a simple message
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_message(msg: &str) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    writeln!(handle, "{msg}")
}

/// Print a JSON-formatted result for any serializable value
///
/// # Errors
///
/// Returns an error if writing to stdout fails.
pub fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(handle, "{json}")
}

// ============================================================================
// Text Formatting
// ============================================================================

/// One-line ticket rendering: icon, id, status and title.
pub(crate) fn format_ticket(ticket: &TicketSummary, config: &OutputConfig) -> String {
    format!(
        "{} {} [{}] {}",
        colored_status_icon(ticket.status, config),
        colorize_id(ticket.id.as_str(), config),
        colorize_status(ticket.status, config),
        ticket.title
    )
}

fn write_tickets_text<W: Write>(
    w: &mut W,
    tickets: &[TicketSummary],
    config: &OutputConfig,
) -> io::Result<()> {
    if tickets.is_empty() {
        return writeln!(w, "No tickets registered.");
    }
    for ticket in tickets {
        writeln!(w, "{}", format_ticket(ticket, config))?;
    }
    writeln!(w)?;
    let count = format!("{} ticket(s)", tickets.len());
    writeln!(w, "{}", dimmed(&count, config))
}

fn write_dependencies_text<W: Write>(
    w: &mut W,
    ticket: &str,
    deps: &[DependencyView],
    config: &OutputConfig,
) -> io::Result<()> {
    if deps.is_empty() {
        return writeln!(w, "{} has no dependencies.", colorize_id(ticket, config));
    }

    let heading = format!("Dependencies of {ticket} ({}):", deps.len());
    writeln!(w, "{}", bold(&heading, config))?;
    for dep in deps {
        let relation = colorize_kind(&dep.relation.to_string(), dep.edge.kind, config);
        writeln!(
            w,
            "  {} {:<10} {}",
            dimmed(&format!("#{}", dep.edge.id), config),
            relation,
            format_ticket(&dep.related, config)
        )?;
    }
    Ok(())
}

fn write_blocked_text<W: Write>(
    w: &mut W,
    blocked: &[BlockedTicket],
    config: &OutputConfig,
) -> io::Result<()> {
    if blocked.is_empty() {
        return writeln!(w, "{}", success("No blocked tickets.", config));
    }

    writeln!(
        w,
        "{}",
        bold(&format!("Blocked tickets ({}):", blocked.len()), config)
    )?;
    for entry in blocked {
        writeln!(w)?;
        writeln!(w, "{}", format_ticket(&entry.ticket, config))?;
        for blocker in &entry.blockers {
            writeln!(
                w,
                "  {} {}",
                error("blocked by", config),
                format_ticket(blocker, config)
            )?;
        }
    }
    Ok(())
}
