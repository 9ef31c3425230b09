//! Error types for rule loading and detection.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading rules or analysing input.
#[derive(Debug, Error)]
pub enum SmallTalksError {
    /// A rule's compiled alternation is not a valid regular expression.
    #[error("invalid pattern in rule '{rule}': {source}")]
    InvalidPattern {
        /// Name of the offending rule.
        rule: String,
        #[source]
        source: regex::Error,
    },

    /// A rule or word-list source could not be read.
    #[error("source unavailable: {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The intents payload is not valid rule JSON.
    #[error("invalid rule data in {}: {source}", path.display())]
    InvalidRuleData {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A word detector failed while processing input.
    #[error("word detector error: {0}")]
    WordDetector(String),
}

impl SmallTalksError {
    /// Returns true if this error happened while loading data rather than
    /// while analysing a specific input.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            SmallTalksError::InvalidPattern { .. }
                | SmallTalksError::SourceUnavailable { .. }
                | SmallTalksError::InvalidRuleData { .. }
        )
    }
}

/// Result type for SmallTalks operations.
pub type Result<T> = std::result::Result<T, SmallTalksError>;
