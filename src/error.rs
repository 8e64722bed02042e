//! Error types for the support router.

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing credential for {provider}: {hint}")]
    MissingCredential { provider: String, hint: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Storage-layer errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

impl DatabaseError {
    /// Classify a libSQL error, separating uniqueness violations from other failures.
    pub(crate) fn from_libsql(context: &str, err: libsql::Error) -> Self {
        let text = err.to_string();
        if text.contains("UNIQUE constraint failed") {
            Self::Constraint(format!("{context}: {text}"))
        } else {
            Self::Query(format!("{context}: {text}"))
        }
    }
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },}

/// Errors raised while dispatching a single message.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Classifier unavailable: {0}")]
    Config(#[from] ConfigError),

    #[error("Ticket storage failed: {0}")]
    Storage(#[from] DatabaseError),

    #[error("Classification failed: {0}")]
    Llm(#[from] LlmError),
}

/// Result type alias for the router.
pub type Result<T> = std::result::Result<T, Error>;
