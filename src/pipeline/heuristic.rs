//! Keyword heuristic: deterministic intent classification without the LLM.
//!
//! Rules are checked in strict priority order; the first one that fires wins:
//! 1. strong negative keyword → NegativeFeedback
//! 2. query keyword plus "ticket"/"status" → Query
//! 3. positive keyword → PositiveFeedback
//! 4. any problem keyword → NegativeFeedback
//! 5. nothing matched → PositiveFeedback
//!
//! Matching is plain substring containment on the lower-cased message.

use tracing::debug;

use crate::pipeline::types::IntentLabel;

const STRONG_NEGATIVE: &[&str] = &[
    "hate", "worst", "terrible", "awful", "crashes", "broken", "useless", "horrible", "sucks",
    "garbage",
];

const POSITIVE: &[&str] = &[
    "thank",
    "thanks",
    "great",
    "excellent",
    "good",
    "love",
    "amazing",
    "wonderful",
    "perfect",
    "smooth",
    "best",
    "always best",
    "experience",
];

const PROBLEM: &[&str] = &[
    "problem",
    "issue",
    "error",
    "not working",
    "failed",
    "trouble",
    "complaint",
    "bad",
    "hasn't arrived",
    "delayed",
];

const QUERY: &[&str] = &["status", "check", "ticket", "what is", "how is", "update"];

/// A query keyword only counts when the message also names one of these.
const QUERY_SUBJECT: &[&str] = &["ticket", "status"];

/// Which rule produced a heuristic decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeuristicRule {
    StrongNegative,
    TicketQuery,
    Positive,
    Problem,
    DefaultPositive,
}

/// A heuristic decision and the rule behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicMatch {
    pub label: IntentLabel,
    pub rule: HeuristicRule,
}

/// Deterministic keyword classifier over the fixed keyword lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordHeuristic;

impl KeywordHeuristic {
    /// Evaluate a message and report which rule fired.
    pub fn evaluate(&self, message: &str) -> HeuristicMatch {
        let lower = message.to_lowercase();
        let contains_any = |words: &[&str]| words.iter().any(|w| lower.contains(w));

        let decision = if contains_any(STRONG_NEGATIVE) {
            HeuristicMatch {
                label: IntentLabel::NegativeFeedback,
                rule: HeuristicRule::StrongNegative,
            }
        } else if contains_any(QUERY) && contains_any(QUERY_SUBJECT) {
            HeuristicMatch {
                label: IntentLabel::Query,
                rule: HeuristicRule::TicketQuery,
            }
        } else if contains_any(POSITIVE) {
            HeuristicMatch {
                label: IntentLabel::PositiveFeedback,
                rule: HeuristicRule::Positive,
            }
        } else if contains_any(PROBLEM) {
            HeuristicMatch {
                label: IntentLabel::NegativeFeedback,
                rule: HeuristicRule::Problem,
            }
        } else {
            HeuristicMatch {
                label: IntentLabel::PositiveFeedback,
                rule: HeuristicRule::DefaultPositive,
            }
        };

        debug!(
            label = decision.label.label(),
            rule = ?decision.rule,
            "Keyword heuristic decision"
        );
        decision
    }

    /// Classify a message.
    pub fn classify(&self, message: &str) -> IntentLabel {
        self.evaluate(message).label
    }
}
