//! Dispatcher: classifies inbound messages and routes them to a handler.
//!
//! Flow per message:
//! 1. `IntentClassifier::classify` → exactly one `IntentLabel`
//! 2. Handler selected by exact match on the label
//! 3. `LogEntry` appended to this dispatcher's `DispatchLog` and returned

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};

use crate::config::RouterConfig;
use crate::error::PipelineError;
use crate::pipeline::classifier::IntentClassifier;
use crate::pipeline::handlers::{
    NEGATIVE_HANDLER_NAME, NegativeFeedbackHandler, POSITIVE_HANDLER_NAME,
    PositiveFeedbackHandler, QUERY_HANDLER_NAME, QueryHandler,
};
use crate::pipeline::log::DispatchLog;
use crate::pipeline::types::{InboundMessage, IntentLabel, LogEntry};
use crate::store::TicketStore;

/// Routes classified messages to their handlers and keeps the dispatch log.
pub struct Dispatcher {
    classifier: IntentClassifier,
    positive: PositiveFeedbackHandler,
    negative: NegativeFeedbackHandler,
    query: QueryHandler,
    log: DispatchLog,
}

impl Dispatcher {
    /// Create a dispatcher from a classifier and a ticket store.
    pub fn new(classifier: IntentClassifier, store: Arc<dyn TicketStore>) -> Self {
        Self {
            classifier,
            positive: PositiveFeedbackHandler,
            negative: NegativeFeedbackHandler::new(store.clone()),
            query: QueryHandler::new(store),
            log: DispatchLog::new(),
        }
    }

    /// Assemble a dispatcher from configuration.
    ///
    /// Fails immediately if the configured classifier cannot be built
    /// (e.g. the external strategy without a credential).
    pub fn from_config(
        config: &RouterConfig,
        store: Arc<dyn TicketStore>,
    ) -> Result<Self, PipelineError> {
        let classifier = IntentClassifier::from_config(config)?;
        Ok(Self::new(classifier, store))
    }

    /// Replace the negative-feedback handler (custom id generation).
    pub fn with_negative_handler(mut self, handler: NegativeFeedbackHandler) -> Self {
        self.negative = handler;
        self
    }

    /// Process one message. `customer_name` defaults to `"Customer"`.
    pub async fn process(
        &self,
        message: &str,
        customer_name: Option<&str>,
    ) -> Result<LogEntry, PipelineError> {
        let mut inbound = InboundMessage::new(message);
        if let Some(name) = customer_name {
            inbound = inbound.with_customer_name(name);
        }
        self.process_message(&inbound).await
    }

    /// Process one inbound message through classify → handle → log.
    pub async fn process_message(
        &self,
        message: &InboundMessage,
    ) -> Result<LogEntry, PipelineError> {
        let customer_name = message.display_name().to_string();

        let classification = self.classifier.classify(&message.content).await?;
        info!(
            label = classification.label.label(),
            external = classification.used_external_service,
            "Message classified"
        );

        let (handler_name, response) = match classification.label {
            IntentLabel::PositiveFeedback => {
                (POSITIVE_HANDLER_NAME, self.positive.handle(&customer_name))
            }
            IntentLabel::NegativeFeedback => {
                (NEGATIVE_HANDLER_NAME, self.negative.handle(&message.content).await?)
            }
            IntentLabel::Query => (QUERY_HANDLER_NAME, self.query.handle(&message.content).await?),
        };

        let entry = LogEntry {
            message: message.content.clone(),
            customer_name,
            intent_label: classification.label,
            handler_name: handler_name.to_string(),
            response,
            used_external_service: classification.used_external_service,
            logged_at: Utc::now(),
        };
        self.log.append(entry.clone()).await;

        info!(
            label = entry.intent_label.label(),
            handler = %entry.handler_name,
            "Dispatch complete"
        );
        Ok(entry)
    }

    /// Process a batch of messages.
    ///
    /// Each message is processed independently. Failures are logged but
    /// don't fail the batch.
    pub async fn process_batch(&self, messages: Vec<InboundMessage>) -> Vec<LogEntry> {
        let count = messages.len();
        info!(count, "Processing message batch");

        let mut results = Vec::with_capacity(count);
        for message in &messages {
            match self.process_message(message).await {
                Ok(entry) => results.push(entry),
                Err(e) => {
                    error!(error = %e, "Failed to process message in batch");
                }
            }
        }

        info!(
            processed = results.len(),
            total = count,
            "Batch processing complete"
        );
        results
    }

    /// The dispatch log.
    pub fn log(&self) -> &DispatchLog {
        &self.log
    }

    /// Snapshot of all log entries, oldest first.
    pub async fn logs(&self) -> Vec<LogEntry> {
        self.log.entries().await
    }
}

/// Handler name expected for a given label.
pub fn handler_name_for(label: IntentLabel) -> &'static str {
    match label {
        IntentLabel::PositiveFeedback => POSITIVE_HANDLER_NAME,
        IntentLabel::NegativeFeedback => NEGATIVE_HANDLER_NAME,
        IntentLabel::Query => QUERY_HANDLER_NAME,
    }
}
