//! Intent classifier: maps a message to exactly one `IntentLabel`.
//!
//! Two strategies, picked at assembly time:
//! - **External**: a fixed few-shot prompt sent to the completion service,
//!   reply decoded by `decode_intent`.
//! - **Heuristic**: the deterministic `KeywordHeuristic`, no network.
//!
//! The external strategy never falls back to the heuristic on its own.
//! Service failures are returned to the caller.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{ClassifierStrategy, RouterConfig};
use crate::error::PipelineError;
use crate::llm::{self, ChatMessage, CompletionRequest, LlmProvider};
use crate::pipeline::heuristic::KeywordHeuristic;
use crate::pipeline::types::{ClassificationResult, IntentLabel};

/// Output cap for the classification call. The reply is a label name only.
pub const CLASSIFIER_MAX_TOKENS: u32 = 20;

/// Sampling temperature for classification.
pub const CLASSIFIER_TEMPERATURE: f32 = 0.0;

/// Label assigned when the service reply names none of the known tokens.
///
/// Opening a ticket is preferred over dropping a possibly urgent message.
pub const UNPARSEABLE_REPLY_POLICY: IntentLabel = IntentLabel::NegativeFeedback;

enum Backend {
    External(Arc<dyn LlmProvider>),
    Heuristic(KeywordHeuristic),
}

/// Classifies inbound messages.
pub struct IntentClassifier {
    backend: Backend,
}

impl IntentClassifier {
    /// Classifier backed by the completion service.
    pub fn external(llm: Arc<dyn LlmProvider>) -> Self {
        Self {
            backend: Backend::External(llm),
        }
    }

    /// Classifier backed by the keyword heuristic.
    pub fn heuristic() -> Self {
        Self {
            backend: Backend::Heuristic(KeywordHeuristic),
        }
    }

    /// Assemble the classifier selected by configuration.
    ///
    /// The external strategy requires a credential; its absence fails here,
    /// before any message is processed.
    pub fn from_config(config: &RouterConfig) -> Result<Self, PipelineError> {
        match config.classifier {
            ClassifierStrategy::External => {
                let provider = llm::provider_from_router_config(config)?;
                Ok(Self::external(provider))
            }
            ClassifierStrategy::Heuristic => {
                info!("Using keyword heuristic classifier (no external service)");
                Ok(Self::heuristic())
            }
        }
    }

    /// The active strategy.
    pub fn strategy(&self) -> ClassifierStrategy {
        match self.backend {
            Backend::External(_) => ClassifierStrategy::External,
            Backend::Heuristic(_) => ClassifierStrategy::Heuristic,
        }
    }

    /// Classify a message with the active strategy.
    pub async fn classify(&self, message: &str) -> Result<ClassificationResult, PipelineError> {
        match &self.backend {
            Backend::External(llm) => {
                let label = self.classify_external(llm.as_ref(), message).await?;
                Ok(ClassificationResult {
                    label,
                    used_external_service: true,
                })
            }
            Backend::Heuristic(heuristic) => Ok(ClassificationResult {
                label: heuristic.classify(message),
                used_external_service: false,
            }),
        }
    }

    /// Deterministic keyword classification, usable without the service.
    pub fn fallback_classify(message: &str) -> IntentLabel {
        KeywordHeuristic.classify(message)
    }

    async fn classify_external(
        &self,
        llm: &dyn LlmProvider,
        message: &str,
    ) -> Result<IntentLabel, PipelineError> {
        let request = CompletionRequest::new(vec![ChatMessage::user(build_classifier_prompt(
            message,
        ))])
        .with_temperature(CLASSIFIER_TEMPERATURE)
        .with_max_tokens(CLASSIFIER_MAX_TOKENS);

        let response = llm.complete(request).await?;
        let label = decode_intent(&response.content);

        debug!(
            model = llm.model_name(),
            label = label.label(),
            "External classification complete"
        );
        Ok(label)
    }
}

// ── Prompt construction ─────────────────────────────────────────────

/// Build the few-shot classification prompt for a message.
pub fn build_classifier_prompt(message: &str) -> String {
    format!(
        "You are a banking customer service classifier. Classify this message into EXACTLY ONE category:\n\n\
         POSITIVE_FEEDBACK: Customer is happy, satisfied, thanking, praising, or expressing gratitude\n\
         NEGATIVE_FEEDBACK: Customer is complaining, unhappy, reporting problems, or expressing dissatisfaction\n\
         QUERY: Customer is asking about ticket status, requesting information, or checking on something\n\n\
         Examples:\n\
         - \"Thanks for helping me\" → POSITIVE_FEEDBACK\n\
         - \"I hate your app, it crashes\" → NEGATIVE_FEEDBACK\n\
         - \"What's the status of ticket 123?\" → QUERY\n\
         - \"It is always best experience\" → POSITIVE_FEEDBACK\n\n\
         Message: \"{message}\"\n\n\
         Respond with ONLY the category name (POSITIVE_FEEDBACK, NEGATIVE_FEEDBACK, or QUERY):"
    )
}

// ── Reply decoding ──────────────────────────────────────────────────

/// Decode a service reply into a label, or `None` if no token is present.
///
/// Case-insensitive substring search, checked in the order
/// POSITIVE, NEGATIVE, QUERY.
pub fn decode_intent_strict(raw: &str) -> Option<IntentLabel> {
    let normalized = raw.trim().to_uppercase();
    if normalized.contains("POSITIVE") {
        Some(IntentLabel::PositiveFeedback)
    } else if normalized.contains("NEGATIVE") {
        Some(IntentLabel::NegativeFeedback)
    } else if normalized.contains("QUERY") {
        Some(IntentLabel::Query)
    } else {
        None
    }
}

/// Decode a service reply, applying `UNPARSEABLE_REPLY_POLICY` when nothing matches.
pub fn decode_intent(raw: &str) -> IntentLabel {
    decode_intent_strict(raw).unwrap_or_else(|| {
        warn!(
            raw_response = %raw,
            fallback = UNPARSEABLE_REPLY_POLICY.label(),
            "Unrecognized classifier reply, applying default label"
        );
        UNPARSEABLE_REPLY_POLICY
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::{ConfigError, LlmError};
    use crate::llm::provider::CompletionResponse;

    /// Mock LLM that returns a fixed reply and records requests.
    struct MockClassifierLlm {
        reply: Result<String, ()>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl MockClassifierLlm {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(()),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait::async_trait]
    impl LlmProvider for MockClassifierLlm {
        fn model_name(&self) -> &str {
            "mock-classifier"
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.requests.lock().unwrap().push(request);
            match &self.reply {
                Ok(content) => Ok(CompletionResponse {
                    content: content.clone(),
                    input_tokens: 120,
                    output_tokens: 3,
                }),
                Err(()) => Err(LlmError::AuthFailed {
                    provider: "mock".into(),
                }),
            }
        }
    }

    // ── Prompt ──────────────────────────────────────────────────────

    #[test]
    fn prompt_contains_labels_examples_and_message() {
        let prompt = build_classifier_prompt("Where is my refund?");
        for label in IntentLabel::ALL {
            assert!(prompt.contains(label.canonical_token()));
        }
        assert!(prompt.contains("\"Thanks for helping me\" → POSITIVE_FEEDBACK"));
        assert!(prompt.contains("\"I hate your app, it crashes\" → NEGATIVE_FEEDBACK"));
        assert!(prompt.contains("\"What's the status of ticket 123?\" → QUERY"));
        assert!(prompt.contains("\"It is always best experience\" → POSITIVE_FEEDBACK"));
        assert!(prompt.contains("Message: \"Where is my refund?\""));
    }

    // ── Decoding ────────────────────────────────────────────────────

    #[test]
    fn decode_canonical_tokens() {
        assert_eq!(decode_intent("POSITIVE_FEEDBACK"), IntentLabel::PositiveFeedback);
        assert_eq!(decode_intent("NEGATIVE_FEEDBACK"), IntentLabel::NegativeFeedback);
        assert_eq!(decode_intent("QUERY"), IntentLabel::Query);
    }

    #[test]
    fn decode_is_case_insensitive_and_trims() {
        assert_eq!(decode_intent("  query\n"), IntentLabel::Query);
        assert_eq!(
            decode_intent("Category: positive_feedback."),
            IntentLabel::PositiveFeedback
        );
    }

    #[test]
    fn decode_unparseable_applies_policy() {
        assert_eq!(decode_intent_strict("I am not sure"), None);
        assert_eq!(decode_intent("I am not sure"), UNPARSEABLE_REPLY_POLICY);
        assert_eq!(decode_intent(""), IntentLabel::NegativeFeedback);
    }

    #[test]
    fn decode_checks_positive_before_negative() {
        assert_eq!(
            decode_intent("NEGATIVE? no, POSITIVE"),
            IntentLabel::PositiveFeedback
        );
    }

    // ── Classifier ──────────────────────────────────────────────────

    #[tokio::test]
    async fn external_classification_sends_deterministic_request() {
        let llm = MockClassifierLlm::replying("QUERY");
        let classifier = IntentClassifier::external(llm.clone());

        let result = classifier
            .classify("What is the status of ticket #482913?")
            .await
            .unwrap();
        assert_eq!(result.label, IntentLabel::Query);
        assert!(result.used_external_service);

        let requests = llm.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].temperature, Some(0.0));
        assert_eq!(requests[0].max_tokens, Some(CLASSIFIER_MAX_TOKENS));
        assert_eq!(requests[0].messages.len(), 1);
        assert!(requests[0].messages[0].content.contains("#482913"));
    }

    #[tokio::test]
    async fn external_unparseable_reply_still_marks_service_used() {
        let classifier = IntentClassifier::external(MockClassifierLlm::replying("¯\\_(ツ)_/¯"));
        let result = classifier.classify("hmm").await.unwrap();
        assert_eq!(result.label, IntentLabel::NegativeFeedback);
        assert!(result.used_external_service);
    }

    #[tokio::test]
    async fn external_labels_agree_with_decode_intent() {
        for reply in ["POSITIVE_FEEDBACK", " query ", "", "no idea", "negative"] {
            let classifier = IntentClassifier::external(MockClassifierLlm::replying(reply));
            let result = classifier.classify("any message").await.unwrap();
            assert_eq!(result.label, decode_intent(reply), "reply {reply:?}");
        }
    }

    #[tokio::test]
    async fn external_failure_is_not_downgraded() {
        let classifier = IntentClassifier::external(MockClassifierLlm::failing());
        let err = classifier.classify("Thanks!").await.unwrap_err();
        assert!(matches!(err, PipelineError::Llm(LlmError::AuthFailed { .. })));
    }

    #[tokio::test]
    async fn heuristic_strategy_skips_service() {
        let classifier = IntentClassifier::heuristic();
        assert_eq!(classifier.strategy(), ClassifierStrategy::Heuristic);

        let result = classifier.classify("I hate your app, it crashes").await.unwrap();
        assert_eq!(result.label, IntentLabel::NegativeFeedback);
        assert!(!result.used_external_service);
    }

    #[test]
    fn from_config_without_key_fails() {
        let config = RouterConfig::default();
        let result = IntentClassifier::from_config(&config);
        assert!(matches!(
            result,
            Err(PipelineError::Config(ConfigError::MissingCredential { .. }))
        ));
    }

    #[test]
    fn from_config_heuristic_needs_no_key() {
        let config = RouterConfig {
            classifier: ClassifierStrategy::Heuristic,
            ..RouterConfig::default()
        };
        let classifier = IntentClassifier::from_config(&config).unwrap();
        assert_eq!(classifier.strategy(), ClassifierStrategy::Heuristic);
    }

    #[test]
    fn fallback_classify_available_standalone() {
        assert_eq!(
            IntentClassifier::fallback_classify("Thanks for helping me"),
            IntentLabel::PositiveFeedback
        );
    }
}
