//! Classification-and-routing pipeline.
//!
//! Every inbound message flows through:
//! 1. `IntentClassifier::classify()`: completion service or keyword heuristic
//! 2. `Dispatcher`: exact-match routing to one handler per intent
//! 3. Handler: thank, open a ticket, or report a ticket's status
//! 4. `DispatchLog`: one `LogEntry` appended per successful dispatch

pub mod classifier;
pub mod dispatcher;
pub mod handlers;
pub mod heuristic;
pub mod log;
pub mod types;

pub use classifier::IntentClassifier;
pub use dispatcher::Dispatcher;
pub use types::{ClassificationResult, InboundMessage, IntentLabel, LogEntry};
