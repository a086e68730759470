//! Ticket Model (排队号)

use serde::{Deserialize, Serialize};

use super::Category;
use crate::util::{millis_to_iso, opt_millis_to_iso};

/// Ticket lifecycle status
///
/// ```text
/// waiting --call--> calling --serve--> serving --complete--> completed
/// waiting --skip--> skipped
/// calling/serving --complete--> completed
/// skipped/completed --recall--> calling
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum TicketStatus {
    Waiting,
    Calling,
    Serving,
    Completed,
    Skipped,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Waiting => "waiting",
            TicketStatus::Calling => "calling",
            TicketStatus::Serving => "serving",
            TicketStatus::Completed => "completed",
            TicketStatus::Skipped => "skipped",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flat ticket row joined with its category (database shape)
///
/// Repositories select tickets with the category columns aliased
/// alongside; the API shape with the embedded category object is
/// produced via `Ticket::from`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct TicketRow {
    pub id: i64,
    pub number: i64,
    pub display_number: String,
    pub category_id: i64,
    pub status: TicketStatus,
    pub called_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub counter_number: Option<i64>,
    pub created_at: i64,
    pub category_name: String,
    pub category_prefix: String,
    pub category_description: Option<String>,
    pub category_is_active: bool,
    pub category_sort_order: i32,
    pub category_created_at: i64,
}

/// Ticket as exchanged over the API and the notification channel
///
/// Timestamps are ISO-8601 strings (or null); the category is embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: i64,
    /// Sequence number, unique within {category, calendar day}
    pub number: i64,
    /// `{prefix}-{number:03}`, e.g. "A-007"
    pub display_number: String,
    pub category_id: i64,
    pub category: Category,
    pub status: TicketStatus,
    pub called_at: Option<String>,
    pub completed_at: Option<String>,
    pub counter_number: Option<i64>,
    pub created_at: String,
}

impl From<TicketRow> for Ticket {
    fn from(row: TicketRow) -> Self {
        Self {
            id: row.id,
            number: row.number,
            display_number: row.display_number,
            category_id: row.category_id,
            category: Category {
                id: row.category_id,
                name: row.category_name,
                prefix: row.category_prefix,
                description: row.category_description,
                is_active: row.category_is_active,
                sort_order: row.category_sort_order,
                created_at: row.category_created_at,
            },
            status: row.status,
            called_at: opt_millis_to_iso(row.called_at),
            completed_at: opt_millis_to_iso(row.completed_at),
            counter_number: row.counter_number,
            created_at: millis_to_iso(row.created_at),
        }
    }
}

/// Create ticket payload (kiosk)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketCreate {
    pub category_id: i64,
}

/// Call ticket payload
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TicketCall {
    /// Counter/station announcing the ticket
    pub counter_number: Option<i64>,
}

/// Public display projection: the announced ticket plus the next waiting ones
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentTickets {
    pub current: Option<Ticket>,
    pub next: Vec<Ticket>,
}

/// Result of a queue reset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetResult {
    pub success: bool,
    /// Number of tickets removed
    pub removed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> TicketRow {
        TicketRow {
            id: 1,
            number: 7,
            display_number: "A-007".into(),
            category_id: 3,
            status: TicketStatus::Waiting,
            called_at: None,
            completed_at: None,
            counter_number: None,
            created_at: 1_700_000_000_000,
            category_name: "General".into(),
            category_prefix: "A".into(),
            category_description: None,
            category_is_active: true,
            category_sort_order: 0,
            category_created_at: 1_600_000_000_000,
        }
    }

    #[test]
    fn status_serializes_to_lowercase_literals() {
        assert_eq!(serde_json::to_string(&TicketStatus::Waiting).unwrap(), "\"waiting\"");
        assert_eq!(
            serde_json::from_str::<TicketStatus>("\"completed\"").unwrap(),
            TicketStatus::Completed
        );
    }

    #[test]
    fn ticket_embeds_category_and_iso_timestamps() {
        let ticket = Ticket::from(row());
        assert_eq!(ticket.category.prefix, "A");
        assert_eq!(ticket.created_at, "2023-11-14T22:13:20.000Z");
        assert_eq!(ticket.called_at, None);

        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["display_number"], "A-007");
        assert_eq!(json["category"]["name"], "General");
        assert!(json["called_at"].is_null());
    }
}
