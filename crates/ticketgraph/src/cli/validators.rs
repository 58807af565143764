//! CLI input validation functions.
//!
//! Used by clap's `value_parser` attribute so bad input is rejected at parse
//! time with a specific message.

/// Maximum ticket id length accepted on the command line
pub const MAX_TICKET_ID_LENGTH: usize = 128;

/// Maximum ticket title length
pub const MAX_TITLE_LENGTH: usize = 200;

/// Validate a project name.
///
/// Delegates to `commands::init` so both paths share one rule set.
///
/// # Errors
///
/// Returns the validation message for an invalid name.
pub fn validate_project(s: &str) -> Result<String, String> {
    use crate::commands::init;

    let trimmed = s.trim();
    init::validate_project(trimmed).map_err(|e| e.to_string())?;
    Ok(trimmed.to_string())
}

/// Validate a ticket id.
///
/// Ids are opaque to the engine, so only shape is checked: non-empty, no
/// whitespace, bounded length.
///
/// # Errors
///
/// Returns the validation message for an invalid id.
pub fn validate_ticket_id(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Ticket ID cannot be empty".to_string());
    }

    if s.len() > MAX_TICKET_ID_LENGTH {
        return Err(format!(
            "Ticket ID cannot exceed {MAX_TICKET_ID_LENGTH} characters"
        ));
    }

    if s.chars().any(char::is_whitespace) {
        return Err(format!("Ticket ID '{s}' cannot contain whitespace"));
    }

    Ok(s.to_string())
}

/// Validate a ticket title.
///
/// # Errors
///
/// Returns the validation message for an empty or over-long title.
pub fn validate_title(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Title cannot be empty".to_string());
    }

    if s.chars().count() > MAX_TITLE_LENGTH {
        return Err(format!("Title cannot exceed {MAX_TITLE_LENGTH} characters"));
    }

    Ok(s.to_string())
}

/// Validate a dependency edge id.
///
/// # Errors
///
/// Returns the validation message unless `s` is a positive integer.
pub fn validate_edge_id(s: &str) -> Result<i64, String> {
    let id: i64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid dependency ID '{s}': expected a positive integer"))?;

    if id <= 0 {
        return Err(format!(
            "Invalid dependency ID '{s}': expected a positive integer"
        ));
    }

    Ok(id)
}
