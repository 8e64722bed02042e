//! `TicketStore` trait: the single persistence interface the pipeline depends on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DatabaseError;

/// Status of a support ticket.
///
/// The pipeline only ever writes `Unresolved`; the other values are set by
/// operators outside this crate. Unknown strings are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    Unresolved,
    InProgress,
    Resolved,
    Other(String),
}

impl TicketStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Unresolved => "Unresolved",
            Self::InProgress => "In Progress",
            Self::Resolved => "Resolved",
            Self::Other(s) => s,
        }
    }

    /// Parse a stored status string. Never fails.
    pub fn from_db(s: &str) -> Self {
        match s {
            "Unresolved" => Self::Unresolved,
            "In Progress" => Self::InProgress,
            "Resolved" => Self::Resolved,
            other => Self::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted support ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: String,
    pub status: TicketStatus,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Backend-agnostic ticket storage.
///
/// Insertion must be atomic on `ticket_id`: a duplicate id fails with
/// `DatabaseError::Constraint`, never overwrites.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// Insert a new ticket. `created_at` is assigned by the store.
    async fn insert_ticket(
        &self,
        ticket_id: &str,
        status: &TicketStatus,
        description: &str,
    ) -> Result<(), DatabaseError>;

    /// Look up the status of a ticket.
    async fn get_ticket_status(
        &self,
        ticket_id: &str,
    ) -> Result<Option<TicketStatus>, DatabaseError>;

    /// Fetch a full ticket record.
    async fn get_ticket(&self, ticket_id: &str) -> Result<Option<Ticket>, DatabaseError>;

    /// Number of stored tickets.
    async fn count_tickets(&self) -> Result<usize, DatabaseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_known_values() {
        for status in [
            TicketStatus::Unresolved,
            TicketStatus::InProgress,
            TicketStatus::Resolved,
        ] {
            assert_eq!(TicketStatus::from_db(status.as_str()), status);
        }
    }

    #[test]
    fn unknown_status_preserved() {
        let status = TicketStatus::from_db("Escalated to tier 2");
        assert_eq!(status, TicketStatus::Other("Escalated to tier 2".into()));
        assert_eq!(status.to_string(), "Escalated to tier 2");
    }
}
