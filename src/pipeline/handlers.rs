//! Intent handlers: one per `IntentLabel`.

use std::sync::{Arc, LazyLock};

use rand::Rng;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::error::DatabaseError;
use crate::store::{TicketStatus, TicketStore};

/// Handler name recorded for positive feedback.
pub const POSITIVE_HANDLER_NAME: &str = "Feedback Handler (Positive)";
/// Handler name recorded for negative feedback.
pub const NEGATIVE_HANDLER_NAME: &str = "Feedback Handler (Negative)";
/// Handler name recorded for ticket-status queries.
pub const QUERY_HANDLER_NAME: &str = "Query Handler";

/// How many fresh ids to try before giving up on a duplicate-key failure.
pub const MAX_TICKET_ID_ATTEMPTS: usize = 5;

/// Reply when a query carries no recognizable ticket id.
pub const INVALID_TICKET_REPLY: &str = "Please provide a valid 6-digit ticket number.";

static TICKET_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#?(\d{6})").expect("ticket id pattern is valid"));

/// Generate a uniformly random 6-digit ticket id (100000–999999).
pub fn generate_ticket_id() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Extract the first 6-digit ticket id (optionally `#`-prefixed) from a message.
pub fn extract_ticket_id(message: &str) -> Option<&str> {
    TICKET_ID_PATTERN
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

// ── Positive feedback ───────────────────────────────────────────────

/// Thanks the customer. No side effects.
#[derive(Debug, Clone, Copy, Default)]
pub struct PositiveFeedbackHandler;

impl PositiveFeedbackHandler {
    pub fn handle(&self, customer_name: &str) -> String {
        format!("Thank you for your kind words, {customer_name}! We're delighted to assist you.")
    }
}

// ── Negative feedback ───────────────────────────────────────────────

type IdSource = Box<dyn Fn() -> String + Send + Sync>;

/// Opens an `Unresolved` ticket for the complaint.
pub struct NegativeFeedbackHandler {
    store: Arc<dyn TicketStore>,
    id_source: IdSource,
    max_attempts: usize,
}

impl NegativeFeedbackHandler {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self {
            store,
            id_source: Box::new(generate_ticket_id),
            max_attempts: MAX_TICKET_ID_ATTEMPTS,
        }
    }

    /// Replace the ticket id generator.
    pub fn with_id_source<F>(mut self, source: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.id_source = Box::new(source);
        self
    }

    /// Persist a ticket for `message` and return the apology reply.
    ///
    /// A duplicate id is retried with a fresh one; after `MAX_TICKET_ID_ATTEMPTS`
    /// the constraint error is returned. Other storage errors return at once.
    pub async fn handle(&self, message: &str) -> Result<String, DatabaseError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let ticket_id = (self.id_source)();

            match self
                .store
                .insert_ticket(&ticket_id, &TicketStatus::Unresolved, message)
                .await
            {
                Ok(()) => {
                    info!(ticket_id = %ticket_id, attempt, "Support ticket opened");
                    return Ok(format!(
                        "We apologize for the inconvenience. A new ticket #{ticket_id} has been generated, and our team will follow up shortly."
                    ));
                }
                Err(DatabaseError::Constraint(reason)) if attempt < self.max_attempts => {
                    warn!(
                        ticket_id = %ticket_id,
                        attempt,
                        reason = %reason,
                        "Ticket id collision, regenerating"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }
}

// ── Query ───────────────────────────────────────────────────────────

/// Answers ticket-status questions. Read-only.
pub struct QueryHandler {
    store: Arc<dyn TicketStore>,
}

impl QueryHandler {
    pub fn new(store: Arc<dyn TicketStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, message: &str) -> Result<String, DatabaseError> {
        let Some(ticket_id) = extract_ticket_id(message) else {
            debug!("Query without a ticket id");
            return Ok(INVALID_TICKET_REPLY.to_string());
        };

        // A blank status reads the same as a missing record.
        let status = self
            .store
            .get_ticket_status(ticket_id)
            .await?
            .filter(|status| !status.as_str().trim().is_empty());

        match status {
            Some(status) => {
                debug!(ticket_id = ticket_id, status = %status, "Ticket status found");
                Ok(format!(
                    "Your ticket #{ticket_id} is currently marked as: {status}."
                ))
            }
            None => {
                debug!(ticket_id = ticket_id, "Ticket not found");
                Ok(format!("Ticket #{ticket_id} not found in our system."))
            }
        }
    }
}
