//! Shared types for the classification-and-routing pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Display name used when the caller does not supply one.
pub const DEFAULT_CUSTOMER_NAME: &str = "Customer";

// ── Inbound message ─────────────────────────────────────────────────

/// An inbound customer message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Free-form message text.
    pub content: String,
    /// Customer display name, if known.
    pub customer_name: Option<String>,
}

impl InboundMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            customer_name: None,
        }
    }

    pub fn with_customer_name(mut self, name: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self
    }

    /// The customer name, or `"Customer"` when absent or blank.
    pub fn display_name(&self) -> &str {
        match self.customer_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => DEFAULT_CUSTOMER_NAME,
        }
    }
}

// ── Intent label ────────────────────────────────────────────────────

/// The closed set of intents a message can be classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentLabel {
    PositiveFeedback,
    NegativeFeedback,
    Query,
}

impl IntentLabel {
    pub const ALL: [IntentLabel; 3] = [Self::PositiveFeedback, Self::NegativeFeedback, Self::Query];

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::PositiveFeedback => "positive_feedback",
            Self::NegativeFeedback => "negative_feedback",
            Self::Query => "query",
        }
    }

    /// Token the completion service is asked to answer with.
    pub fn canonical_token(&self) -> &'static str {
        match self {
            Self::PositiveFeedback => "POSITIVE_FEEDBACK",
            Self::NegativeFeedback => "NEGATIVE_FEEDBACK",
            Self::Query => "QUERY",
        }
    }
}

impl std::fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of classifying one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassificationResult {
    pub label: IntentLabel,
    /// True whenever the external completion service was called.
    pub used_external_service: bool,
}

// ── Log entry ───────────────────────────────────────────────────────

/// Record of one dispatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub message: String,
    pub customer_name: String,
    pub intent_label: IntentLabel,
    pub handler_name: String,
    pub response: String,
    pub used_external_service: bool,
    pub logged_at: DateTime<Utc>,
}
