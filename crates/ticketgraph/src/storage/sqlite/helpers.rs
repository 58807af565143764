//! Row conversion and parsing utilities.
//!
//! Also provides SQL column list constants so every query reads columns in the
//! order the row converters expect.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::Row;
use rusqlite::types::Type;

use crate::domain::{
    ActorId, Edge, EdgeId, ProjectId, RelationKind, TicketId, TicketStatus, TicketSummary,
};

/// SQL column list for the `dependency_edges` table.
///
/// Use with `row_to_edge` for consistent column ordering.
pub(crate) const EDGE_COLUMNS: &str =
    "id, project_id, from_ticket, to_ticket, kind, created_at, created_by";

/// SQL column list for the `tickets` table.
///
/// Use with `row_to_ticket` for consistent column ordering.
pub(crate) const TICKET_COLUMNS: &str = "id, title, status";

/// Current time at the precision stored in the database.
///
/// Truncating up front keeps the edge returned from an insert equal to the
/// same edge read back later.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 form; sorts lexicographically in time order.
pub(crate) fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, Type::Text, message.into())
}

/// Parse a relation kind string from the database.
///
/// Returns an error for unrecognized values, indicating possible database corruption.
pub(crate) fn parse_kind(s: &str) -> rusqlite::Result<RelationKind> {
    match s {
        "blocks" => Ok(RelationKind::Blocks),
        "related" => Ok(RelationKind::Related),
        unknown => Err(conversion_error(
            4,
            format!("Unknown relation kind '{unknown}' in database. Database may be corrupted or from a newer version."),
        )),
    }
}

/// Parse a ticket status string from the database.
pub(crate) fn parse_status(s: &str) -> rusqlite::Result<TicketStatus> {
    s.parse()
        .map_err(|_| conversion_error(2, format!("Unknown ticket status '{s}' in database.")))
}

fn parse_timestamp(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| conversion_error(5, format!("Invalid timestamp '{s}': {e}")))
}

/// Convert a row selected with [`EDGE_COLUMNS`] into an [`Edge`].
pub(crate) fn row_to_edge(row: &Row<'_>) -> rusqlite::Result<Edge> {
    let kind: String = row.get(4)?;
    let created_at: String = row.get(5)?;

    Ok(Edge {
        id: EdgeId(row.get(0)?),
        project_id: ProjectId(row.get(1)?),
        from_ticket: TicketId(row.get(2)?),
        to_ticket: TicketId(row.get(3)?),
        kind: parse_kind(&kind)?,
        created_at: parse_timestamp(&created_at)?,
        created_by: row.get::<_, Option<String>>(6)?.map(ActorId),
    })
}

/// Convert a row selected with [`TICKET_COLUMNS`] into a [`TicketSummary`].
pub(crate) fn row_to_ticket(row: &Row<'_>) -> rusqlite::Result<TicketSummary> {
    let status: String = row.get(2)?;

    Ok(TicketSummary {
        id: TicketId(row.get(0)?),
        title: row.get(1)?,
        status: parse_status(&status)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kind_rejects_unknown() {
        assert!(parse_kind("parent-child").is_err());
        assert_eq!(parse_kind("blocks").unwrap(), RelationKind::Blocks);
    }

    #[test]
    fn test_timestamp_round_trip_is_exact() {
        let ts = now();
        assert_eq!(parse_timestamp(&format_timestamp(&ts)).unwrap(), ts);
    }

    #[test]
    fn test_timestamps_sort_as_text() {
        let earlier = DateTime::parse_from_rfc3339("2026-01-02T03:04:05.000001Z")
            .unwrap()
            .with_timezone(&Utc);
        let later = DateTime::parse_from_rfc3339("2026-01-02T03:04:05.100000Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(format_timestamp(&earlier) < format_timestamp(&later));
    }
}
