//! Error types for report ingestion, projection and summarization.
//!
//! Every variant is recoverable: callers report it to the user and keep
//! the report store in its last known good state.

use thiserror::Error;

/// Errors surfaced by the core operations.
#[derive(Debug, Error)]
pub enum WatchError {
    /// A bulk import document is missing required columns.
    #[error("Missing columns: {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    /// A single value could not be parsed.
    #[error("Could not parse timestamp: {value:?}")]
    Parse { value: String },

    /// The text-generation service was unreachable or rejected the request.
    #[error("AI analysis failed: {message}")]
    Upstream { message: String },

    /// Required configuration (usually a credential) is missing.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// File store or journal I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A delimited document could not be read or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A journal entry or payload could not be (de)serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WatchError {
    /// Shorthand for an upstream failure.
    pub fn upstream(message: impl Into<String>) -> Self {
        WatchError::Upstream {
            message: message.into(),
        }
    }

    /// Shorthand for a configuration failure.
    pub fn configuration(message: impl Into<String>) -> Self {
        WatchError::Configuration {
            message: message.into(),
        }
    }
}

/// Result alias used across the crate's core modules.
pub type WatchResult<T> = Result<T, WatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_lists_columns() {
        let err = WatchError::Schema {
            missing: vec!["zipcode".to_string(), "alert".to_string()],
        };
        assert_eq!(err.to_string(), "Missing columns: zipcode, alert");
    }

    #[test]
    fn test_shorthand_constructors() {
        assert!(matches!(
            WatchError::upstream("boom"),
            WatchError::Upstream { .. }
        ));
        assert!(WatchError::configuration("OPENAI_API_KEY is not set")
            .to_string()
            .contains("OPENAI_API_KEY"));
    }
}
