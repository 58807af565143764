//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Done:   green  (closed tickets, completed actions)
//!   - Warning/Active: yellow (in-progress tickets)
//!   - Error/Blocked:  red    (blocking edges, failures)
//!   - Info/Reference: cyan   (ticket IDs, graph roots)
//!   - Muted:          dimmed (edge IDs, connectors)

use crate::domain::{RelationKind, TicketStatus};
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
#[must_use]
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
#[must_use]
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
#[must_use]
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply color to status text based on ticket status.
pub(crate) fn colorize_status(status: TicketStatus, config: &OutputConfig) -> String {
    let text = status.as_str().to_string();
    if !config.use_colors {
        return text;
    }
    match status {
        TicketStatus::Open => text.white().to_string(),
        TicketStatus::InProgress => text.yellow().to_string(),
        TicketStatus::Closed => text.green().to_string(),
    }
}

/// Colorize a ticket ID (cyan).
pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return id.to_string();
    }
    id.cyan().to_string()
}

/// Colorize a relation kind: blocking edges red, related edges dimmed.
pub(crate) fn colorize_kind(label: &str, kind: RelationKind, config: &OutputConfig) -> String {
    if !config.use_colors {
        return label.to_string();
    }
    match kind {
        RelationKind::Blocks => label.red().to_string(),
        RelationKind::Related => label.dimmed().to_string(),
    }
}

/// Status icon, with an ASCII fallback.
pub(crate) fn status_icon(status: TicketStatus, config: &OutputConfig) -> &'static str {
    match (status, config.use_ascii) {
        (TicketStatus::Open, false) => "○",
        (TicketStatus::InProgress, false) => "◐",
        (TicketStatus::Closed, false) => "●",
        (TicketStatus::Open, true) => "[ ]",
        (TicketStatus::InProgress, true) => "[~]",
        (TicketStatus::Closed, true) => "[x]",
    }
}

/// Status icon colored like its status.
pub(crate) fn colored_status_icon(status: TicketStatus, config: &OutputConfig) -> String {
    let icon = status_icon(status, config);
    if !config.use_colors {
        return icon.to_string();
    }
    match status {
        TicketStatus::Open => icon.white().to_string(),
        TicketStatus::InProgress => icon.yellow().to_string(),
        TicketStatus::Closed => icon.green().to_string(),
    }
}

/// Apply dimmed styling to text.
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold styling to text.
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}
