//! Support router: classifies customer messages and routes them to handlers.

pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod repl;
pub mod store;
